use std::sync::Arc;

use pretty_assertions::assert_eq;
use serde_json::json;
use wrap_core::Error;
use wrap_core::ResolutionContext;
use wrap_core::UriPackageOrWrapper;
use wrap_core::UriResolver;
use wrap_core::resolution::build_clean_history;
use wrap_core::resolution::get_uri_resolution_path;
use wrap_resolvers::PackageResolver;
use wrap_resolvers::RecursiveResolver;
use wrap_resolvers::RedirectResolver;
use wrap_resolvers::UriResolverAggregator;
use wrap_resolvers::WrapperResolver;
use wrap_test_support::MockPackage;
use wrap_test_support::MockWrapper;
use wrap_test_support::NoopInvoker;
use wrap_test_support::uri;

fn redirect(from: &str, to: &str) -> Arc<dyn UriResolver> {
    Arc::new(RedirectResolver::new(uri(from), uri(to)))
}

fn recursive_aggregate(resolvers: Vec<Arc<dyn UriResolver>>) -> RecursiveResolver {
    RecursiveResolver::new(Arc::new(UriResolverAggregator::new(resolvers)))
}

#[tokio::test]
async fn redirect_chain_renders_two_steps() {
    let resolver = recursive_aggregate(vec![
        redirect("test/1", "test/2"),
        redirect("test/2", "test/3"),
    ]);
    let ctx = ResolutionContext::new();

    let result = resolver
        .try_resolve_uri(&uri("test/1"), NoopInvoker::arc(), &ctx)
        .await
        .expect("resolves");

    assert_eq!(result, UriPackageOrWrapper::Uri(uri("test/3")));
    let clean = build_clean_history(&get_uri_resolution_path(&ctx.history()), None);
    assert_eq!(
        serde_json::to_value(&clean).expect("serialize"),
        json!([
            "wrap://test/1 => UriResolverAggregator => uri(wrap://test/2)",
            ["wrap://test/1 => Redirect (wrap://test/1 - wrap://test/2) => uri(wrap://test/2)"],
            "wrap://test/2 => UriResolverAggregator => uri(wrap://test/3)",
            ["wrap://test/2 => Redirect (wrap://test/2 - wrap://test/3) => uri(wrap://test/3)"],
        ])
    );
}

#[tokio::test]
async fn full_history_keeps_misses_and_the_final_fixpoint() {
    let resolver = recursive_aggregate(vec![
        redirect("test/1", "test/2"),
        redirect("test/2", "test/3"),
    ]);
    let ctx = ResolutionContext::new();

    resolver
        .try_resolve_uri(&uri("test/1"), NoopInvoker::arc(), &ctx)
        .await
        .expect("resolves");

    let clean = build_clean_history(&ctx.history(), Some(0));
    assert_eq!(
        serde_json::to_value(&clean).expect("serialize"),
        json!([
            "wrap://test/1 => UriResolverAggregator => uri(wrap://test/2)",
            "wrap://test/2 => UriResolverAggregator => uri(wrap://test/3)",
            "wrap://test/3 => UriResolverAggregator => uri(wrap://test/3)",
        ])
    );
}

#[tokio::test]
async fn fixpoint_result_is_stable_under_the_delegate() {
    let aggregator: Arc<dyn UriResolver> = Arc::new(UriResolverAggregator::new(vec![
        redirect("test/a", "test/b"),
        redirect("test/b", "test/c"),
        Arc::new(PackageResolver::new(
            uri("test/pkg"),
            Arc::new(MockPackage::new("pkg")),
        )),
    ]));
    let resolver = RecursiveResolver::new(Arc::clone(&aggregator));

    for start in ["test/a", "test/b", "test/c", "test/pkg", "test/none"] {
        let result = resolver
            .try_resolve_uri(&uri(start), NoopInvoker::arc(), &ResolutionContext::new())
            .await
            .expect("resolves");

        match &result {
            UriPackageOrWrapper::Uri(settled) => {
                let again = aggregator
                    .try_resolve_uri(settled, NoopInvoker::arc(), &ResolutionContext::new())
                    .await
                    .expect("delegate");
                assert!(again.is_miss_for(settled), "{start} settled on {settled}");
            }
            UriPackageOrWrapper::Package { .. } | UriPackageOrWrapper::Wrapper { .. } => {}
        }
    }
}

#[tokio::test]
async fn cycle_through_an_aggregator_is_detected() {
    let resolver = recursive_aggregate(vec![
        redirect("test/a", "test/b"),
        redirect("test/b", "test/a"),
    ]);
    let ctx = ResolutionContext::new();

    let err = resolver
        .try_resolve_uri(&uri("test/a"), NoopInvoker::arc(), &ctx)
        .await
        .expect_err("cycle");

    let Error::InfiniteLoop { uri: looped, history } = &err else {
        panic!("expected infinite loop, got {err:?}");
    };
    assert_eq!(looped, &uri("test/a"));
    assert_eq!(history.len(), 2);
    assert!(!ctx.is_resolving(&uri("test/a")));
    assert!(!ctx.is_resolving(&uri("test/b")));
}

#[tokio::test]
async fn redirect_to_wrapper_ends_on_the_wrapper() {
    let wrapper = Arc::new(MockWrapper::new("final"));
    let resolver = recursive_aggregate(vec![
        redirect("test/alias", "test/final"),
        Arc::new(WrapperResolver::new(uri("test/final"), Arc::clone(&wrapper) as _)),
    ]);

    let result = resolver
        .try_resolve_uri(&uri("test/alias"), NoopInvoker::arc(), &ResolutionContext::new())
        .await
        .expect("resolves");

    assert_eq!(
        result,
        UriPackageOrWrapper::Wrapper {
            uri: uri("test/final"),
            wrapper,
        }
    );
}
