use std::sync::Arc;

use pretty_assertions::assert_eq;
use wrap_core::Error;
use wrap_core::ResolutionContext;
use wrap_core::UriPackageOrWrapper;
use wrap_core::UriResolver;
use wrap_core::WrapKind;
use wrap_core::WrapManifest;
use wrap_core::manifest::WRAP_MODULE_FILE;
use wrap_core::resolution::CleanHistoryEntry;
use wrap_core::resolution::build_clean_history;
use wrap_resolvers::BasicResolutionResultCache;
use wrap_resolvers::ExtendableUriResolver;
use wrap_resolvers::RecursiveResolver;
use wrap_resolvers::ResolutionResultCacheResolver;
use wrap_resolvers::StaticResolver;
use wrap_resolvers::UriResolverAggregator;
use wrap_test_support::MockExtension;
use wrap_test_support::MockRuntime;
use wrap_test_support::ResolvingInvoker;
use wrap_test_support::uri;

const INTERFACE: &str = "wrap://ens/wraps.eth:uri-resolver-ext@1.1.0";
const LEGACY_INTERFACE: &str = "wrap://ens/wraps.eth:uri-resolver-ext@1.0.0";

struct Harness {
    invoker: ResolvingInvoker,
    runtime: Arc<MockRuntime>,
}

/// `Recursive(ResultCache(Aggregator([static table, Extendable])))` with the
/// invoker resolving through the same stack.
fn harness(table: StaticResolver, implementations: &[(&str, &[&str])]) -> Harness {
    let runtime = Arc::new(MockRuntime::default());
    let aggregator = UriResolverAggregator::new(vec![
        Arc::new(table) as Arc<dyn UriResolver>,
        Arc::new(ExtendableUriResolver::new(Arc::clone(&runtime) as _)),
    ]);
    let stack = RecursiveResolver::new(Arc::new(ResolutionResultCacheResolver::new(
        Arc::new(aggregator),
        Arc::new(BasicResolutionResultCache::new()),
    )));

    let invoker = implementations.iter().fold(
        ResolvingInvoker::new(Arc::new(stack)),
        |invoker, (interface, impls)| invoker.with_implementations(interface, impls),
    );
    Harness { invoker, runtime }
}

fn flatten(history: &[CleanHistoryEntry], out: &mut Vec<String>) {
    for entry in history {
        match entry {
            CleanHistoryEntry::Step(step) => out.push(step.clone()),
            CleanHistoryEntry::Nested(nested) => flatten(nested, out),
        }
    }
}

#[tokio::test]
async fn extension_redirect_then_manifest_yields_a_loadable_package() {
    let manifest = WrapManifest::new("remote", WrapKind::Wasm);
    let extension = Arc::new(
        MockExtension::new()
            .with_redirect("test/alias", "test/remote")
            .with_manifest("test/remote", &manifest)
            .with_file("remote/wrap.wasm", b"\0asm".to_vec()),
    );
    let table = StaticResolver::default().with_wrapper(uri("test/ext"), Arc::clone(&extension) as _);
    let Harness { invoker, runtime } = harness(table, &[(INTERFACE, &["test/ext"])]);
    let ctx = ResolutionContext::new();

    let result = invoker
        .resolve(&uri("test/alias"), &ctx)
        .await
        .expect("resolves");

    let UriPackageOrWrapper::Package { uri: resolved, package } = result else {
        panic!("expected a package");
    };
    assert_eq!(resolved, uri("test/remote"));
    assert_eq!(extension.calls(), 2);
    assert_eq!(extension.file_reads(), 0);

    let wrapper = package.create_wrapper().await.expect("instantiates");
    assert_eq!(runtime.instantiated(), 1);
    assert_eq!(extension.file_reads(), 1);
    assert_eq!(
        wrapper.get_file(WRAP_MODULE_FILE).await.expect("module"),
        b"\0asm".to_vec()
    );

    let mut steps = Vec::new();
    flatten(&build_clean_history(&ctx.history(), None), &mut steps);
    assert!(
        steps
            .iter()
            .any(|step| step.contains("ResolverExtension (wrap://test/ext) => uri(wrap://test/remote)")),
        "{steps:#?}"
    );
    assert!(
        steps
            .iter()
            .any(|step| step.contains("ResolverExtension (wrap://test/ext) => package(wrap://test/remote)")),
        "{steps:#?}"
    );
}

#[tokio::test]
async fn legacy_interface_implementations_are_used() {
    let extension = Arc::new(MockExtension::new().with_redirect("test/old", "test/new"));
    let table = StaticResolver::default().with_wrapper(uri("test/ext"), Arc::clone(&extension) as _);
    let Harness { invoker, .. } = harness(table, &[(LEGACY_INTERFACE, &["test/ext"])]);

    let result = invoker
        .resolve(&uri("test/old"), &ResolutionContext::new())
        .await
        .expect("resolves");

    assert_eq!(result, UriPackageOrWrapper::Uri(uri("test/new")));
}

#[tokio::test]
async fn unresolvable_extension_does_not_recurse_into_itself() {
    let present = Arc::new(MockExtension::new());
    let table = StaticResolver::default().with_wrapper(uri("test/present"), Arc::clone(&present) as _);
    let Harness { invoker, .. } =
        harness(table, &[(INTERFACE, &["test/present", "test/absent"])]);

    let err = invoker
        .resolve(&uri("test/anything"), &ResolutionContext::new())
        .await
        .expect_err("absent extension");

    let Error::ResolverExtensionNotFound {
        uri: failed,
        extension_uri,
        ..
    } = &err
    else {
        panic!("expected extension not found, got {err:?}");
    };
    assert_eq!(failed, &uri("test/anything"));
    assert_eq!(extension_uri, &uri("test/absent"));
    // Once for `test/anything`, once while looking for `test/absent` itself.
    assert_eq!(present.calls(), 2);
}

#[tokio::test]
async fn extension_errors_reach_the_caller() {
    let broken = Arc::new(MockExtension::new().failing("gateway timeout"));
    let table = StaticResolver::default().with_wrapper(uri("test/broken"), Arc::clone(&broken) as _);
    let Harness { invoker, .. } = harness(table, &[(INTERFACE, &["test/broken"])]);

    let err = invoker
        .resolve(&uri("test/anything"), &ResolutionContext::new())
        .await
        .expect_err("extension failure");

    let Error::ResolverExtension { source, .. } = &err else {
        panic!("expected extension error, got {err:?}");
    };
    assert!(source.to_string().contains("gateway timeout"));
}

#[tokio::test]
async fn statically_known_uris_never_reach_extensions() {
    let extension = Arc::new(MockExtension::new().with_redirect("test/a", "test/ext-answer"));
    let table = StaticResolver::default()
        .with_wrapper(uri("test/ext"), Arc::clone(&extension) as _)
        .with_redirect(uri("test/a"), uri("test/static-answer"));
    let Harness { invoker, .. } = harness(table, &[(INTERFACE, &["test/ext"])]);

    let result = invoker
        .resolve(&uri("test/a"), &ResolutionContext::new())
        .await
        .expect("resolves");

    // `test/static-answer` is unknown to both, so the extension sees it once.
    assert_eq!(result, UriPackageOrWrapper::Uri(uri("test/static-answer")));
    assert_eq!(extension.calls(), 1);
}
