use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use serde_json::Value;
use serde_json::json;
use wrap_client::ClientBuilder;
use wrap_client::PluginModule;
use wrap_client::PluginPackage;
use wrap_core::Error;
use wrap_core::Invoker;
use wrap_core::Result;
use wrap_core::Uri;
use wrap_core::WrapKind;
use wrap_core::WrapManifest;
use wrap_core::manifest::WRAP_MODULE_FILE;
use wrap_resolvers::BasicWrapperCache;
use wrap_test_support::MockRuntime;
use wrap_test_support::uri;

const INTERFACE: &str = "wrap://ens/wraps.eth:uri-resolver-ext@1.1.0";

/// Extension serving an in-memory "filesystem" under the `fs` authority.
#[derive(Debug, Default)]
struct FsResolverExt {
    files: HashMap<String, Vec<u8>>,
    resolutions: AtomicUsize,
}

impl FsResolverExt {
    fn with_package(mut self, dir: &str, name: &str, module: &[u8]) -> Self {
        let manifest = WrapManifest::new(name, WrapKind::Wasm)
            .to_bytes()
            .expect("manifest encodes");
        self.files.insert(format!("{dir}/wrap.info"), manifest);
        self.files.insert(format!("{dir}/{WRAP_MODULE_FILE}"), module.to_vec());
        self
    }
}

#[async_trait]
impl PluginModule for FsResolverExt {
    async fn invoke_method(
        &self,
        method: &str,
        args: Value,
        _env: Value,
        _invoker: Arc<dyn Invoker>,
    ) -> Result<Value> {
        match method {
            "tryResolveUri" => {
                self.resolutions.fetch_add(1, Ordering::SeqCst);
                if args["authority"] != "fs" {
                    return Ok(json!({ "uri": null, "manifest": null }));
                }
                let path = args["path"].as_str().unwrap_or_default();
                let manifest = self.files.get(&format!("{path}/wrap.info"));
                Ok(json!({ "uri": null, "manifest": manifest }))
            }
            "getFile" => {
                let path = args["path"].as_str().unwrap_or_default();
                Ok(json!(self.files.get(path)))
            }
            other => Err(Error::Decode(format!("unsupported method {other}"))),
        }
    }
}

struct Setup {
    builder: ClientBuilder,
    extension: Arc<FsResolverExt>,
    runtime: Arc<MockRuntime>,
}

/// The extension is registered under an ens alias that redirects to the
/// plugin, so loading it goes through the same resolver stack.
fn setup() -> Setup {
    let extension = Arc::new(FsResolverExt::default().with_package("pkgs/hello", "hello", b"\0asm-hello"));
    let runtime = Arc::new(MockRuntime::default());
    let builder = ClientBuilder::new()
        .add_redirect(uri("ens/fs-resolver.eth"), uri("plugin/fs-resolver"))
        .add_package(
            uri("plugin/fs-resolver"),
            Arc::new(PluginPackage::new(
                WrapManifest::new("fs-resolver", WrapKind::Plugin),
                Arc::clone(&extension) as _,
            )),
        )
        .add_interface_implementation(uri(INTERFACE), uri("ens/fs-resolver.eth"))
        .with_runtime(Arc::clone(&runtime) as _);
    Setup {
        builder,
        extension,
        runtime,
    }
}

#[tokio::test]
async fn extension_backed_package_is_loaded_through_get_file() {
    let Setup {
        builder,
        extension,
        runtime,
    } = setup();
    let client = builder.build();

    let wrapper = client
        .load_wrapper(&uri("fs/pkgs/hello"), None)
        .await
        .expect("loads");

    assert_eq!(wrapper.get_manifest().expect("manifest").name, "hello");
    assert_eq!(
        wrapper.get_file(WRAP_MODULE_FILE).await.expect("module"),
        b"\0asm-hello".to_vec()
    );
    assert_eq!(
        wrapper
            .get_file_as_string(WRAP_MODULE_FILE)
            .await
            .expect("module is utf-8"),
        "\0asm-hello"
    );
    assert_eq!(runtime.instantiated(), 1);
    assert_eq!(extension.resolutions.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn unknown_paths_are_not_found() {
    let client = setup().builder.build();

    let err = client
        .load_wrapper(&uri("fs/pkgs/missing"), None)
        .await
        .expect_err("missing");

    assert!(matches!(err, Error::WrapperNotFound { .. }));
}

#[tokio::test]
async fn wrapper_cache_skips_the_extension_on_reload() {
    let Setup {
        builder,
        extension,
        runtime,
    } = setup();
    let client = builder
        .with_wrapper_cache(Arc::new(BasicWrapperCache::new()))
        .build();

    let target: Uri = uri("fs/pkgs/hello");
    let first = client.load_wrapper(&target, None).await.expect("loads");
    let second = client.load_wrapper(&target, None).await.expect("loads");

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(runtime.instantiated(), 1);
    assert_eq!(extension.resolutions.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn extensions_need_a_runtime_for_manifests() {
    let Setup { builder, .. } = setup();
    let client = builder
        .with_runtime(Arc::new(MissingModuleRuntime))
        .build();

    let err = client
        .load_wrapper(&uri("fs/pkgs/hello"), None)
        .await
        .expect_err("runtime refuses");

    assert!(matches!(err, Error::WrapperCreate { .. }));
}

#[derive(Debug)]
struct MissingModuleRuntime;

#[async_trait]
impl wrap_core::WrapperRuntime for MissingModuleRuntime {
    async fn instantiate(
        &self,
        manifest: WrapManifest,
        _file_reader: Arc<dyn wrap_core::FileReader>,
    ) -> Result<Arc<dyn wrap_core::Wrapper>> {
        Err(Error::WrapperCreate {
            uri: uri("fs/pkgs/hello"),
            message: format!("cannot instantiate {}", manifest.name),
        })
    }
}

/// Follows extension failures down to the error that started them.
fn innermost(err: &Error) -> &Error {
    match err.root() {
        Error::ResolverExtension { source, .. } => innermost(source),
        other => other,
    }
}

#[tokio::test]
async fn mutually_hosted_extensions_hit_the_depth_limit() {
    for builder in [
        ClientBuilder::new().without_cache(),
        ClientBuilder::new(),
    ] {
        let client = builder
            .add_interface_implementation(uri(INTERFACE), uri("test/e1"))
            .add_interface_implementation(uri(INTERFACE), uri("test/e2"))
            .with_max_depth(16)
            .build();

        let err = client
            .try_resolve_uri(&uri("test/x"), None)
            .await
            .expect_err("extensions cannot load each other");

        assert!(matches!(err, Error::ResolverExtension { .. }), "{err:?}");
        assert!(
            matches!(innermost(&err), Error::RecursionLimit { depth: 16, .. }),
            "{err:?}"
        );
    }
}
