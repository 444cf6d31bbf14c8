use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use serde_json::Value;
use serde_json::json;
use wrap_client::PluginModule;
use wrap_client::PluginPackage;
use wrap_client::WrapClient;
use wrap_core::Error;
use wrap_core::Invoker;
use wrap_core::ResolutionContext;
use wrap_core::Result;
use wrap_core::UriPackageOrWrapper;
use wrap_core::WrapKind;
use wrap_core::WrapManifest;
use wrap_core::resolution::build_clean_history;
use wrap_resolvers::BasicWrapperCache;
use wrap_resolvers::RedirectResolver;
use wrap_test_support::CountingResolver;
use wrap_test_support::MockPackage;
use wrap_test_support::uri;

#[derive(Debug)]
struct Calculator;

#[async_trait]
impl PluginModule for Calculator {
    async fn invoke_method(
        &self,
        method: &str,
        args: Value,
        env: Value,
        invoker: Arc<dyn Invoker>,
    ) -> Result<Value> {
        let a = args["a"].as_i64().unwrap_or_default();
        let b = args["b"].as_i64().unwrap_or_default();
        match method {
            "add" => Ok(json!(a + b + env["offset"].as_i64().unwrap_or_default())),
            // Calls back into the client that invoked it.
            "addTwice" => {
                let args = serde_json::to_vec(&json!({ "a": a, "b": b })).map_err(Error::encode)?;
                let once = invoker
                    .invoke_raw(&uri("test/calc"), "add", Some(&args), None, None)
                    .await?;
                let once: i64 = serde_json::from_slice(&once).map_err(Error::decode)?;
                Ok(json!(once * 2))
            }
            "slow" => {
                tokio::time::sleep(Duration::from_millis(500)).await;
                Ok(Value::Null)
            }
            other => Err(Error::Invoke {
                uri: uri("test/calc"),
                method: other.to_string(),
                message: "unknown method".to_string(),
            }),
        }
    }
}

fn calculator() -> Arc<PluginPackage> {
    Arc::new(PluginPackage::new(
        WrapManifest::new("calculator", WrapKind::Plugin),
        Arc::new(Calculator),
    ))
}

fn client() -> WrapClient {
    WrapClient::builder()
        .add_redirect(uri("test/alias"), uri("test/calc"))
        .add_package(uri("test/calc"), calculator())
        .build()
}

#[tokio::test]
async fn invokes_through_a_redirect() {
    let sum: i64 = client()
        .invoke(&uri("test/alias"), "add", &json!({ "a": 2, "b": 3 }))
        .await
        .expect("invokes");

    assert_eq!(sum, 5);
}

#[tokio::test]
async fn wrappers_can_invoke_other_wrappers() {
    let result: i64 = client()
        .invoke(&uri("test/calc"), "addTwice", &json!({ "a": 1, "b": 2 }))
        .await
        .expect("invokes");

    assert_eq!(result, 6);
}

#[tokio::test]
async fn configured_env_is_passed_to_the_wrapper() {
    let client = WrapClient::builder()
        .add_package(uri("test/calc"), calculator())
        .add_env(uri("test/calc"), &json!({ "offset": 10 }))
        .expect("env encodes")
        .build();

    let sum: i64 = client
        .invoke(&uri("test/calc"), "add", &json!({ "a": 1, "b": 1 }))
        .await
        .expect("invokes");

    assert_eq!(sum, 12);
}

#[tokio::test]
async fn unknown_uri_is_wrapper_not_found_with_history() {
    let client = client();
    let ctx = ResolutionContext::new();

    let err = client
        .load_wrapper(&uri("test/nowhere"), Some(&ctx))
        .await
        .expect_err("not found");

    let Error::WrapperNotFound { uri: missing, history } = &err else {
        panic!("expected wrapper not found, got {err:?}");
    };
    assert_eq!(missing, &uri("test/nowhere"));
    assert!(!history.is_empty());
    assert_eq!(history.len(), ctx.history().len());
}

#[tokio::test]
async fn slow_invocations_time_out() {
    let client = WrapClient::builder()
        .add_package(uri("test/calc"), calculator())
        .with_timeout(Duration::from_millis(20))
        .build();

    let err = client
        .invoke::<Value, _>(&uri("test/calc"), "slow", &json!({}))
        .await
        .expect_err("times out");

    assert!(matches!(
        err,
        Error::InvokeTimeout { ref method, timeout_ms: 20, .. } if method == "slow"
    ));
}

#[tokio::test]
async fn wrapper_cache_instantiates_each_package_once() {
    let package = Arc::new(MockPackage::new("counted"));
    let client = WrapClient::builder()
        .add_redirect(uri("test/alias"), uri("test/counted"))
        .add_package(uri("test/counted"), Arc::clone(&package) as _)
        .with_wrapper_cache(Arc::new(BasicWrapperCache::new()))
        .build();

    let first = client
        .load_wrapper(&uri("test/alias"), None)
        .await
        .expect("loads");
    let second = client
        .load_wrapper(&uri("test/counted"), None)
        .await
        .expect("loads");

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(package.created(), 1);
}

#[tokio::test]
async fn result_cache_keeps_the_package_but_instantiates_per_load() {
    let package = Arc::new(MockPackage::new("counted"));
    let client = WrapClient::builder()
        .add_package(uri("test/counted"), Arc::clone(&package) as _)
        .build();

    for _ in 0..2 {
        client
            .load_wrapper(&uri("test/counted"), None)
            .await
            .expect("loads");
    }

    assert_eq!(package.created(), 2);
}

#[tokio::test]
async fn custom_resolvers_run_after_the_static_table() {
    let custom = Arc::new(CountingResolver::new(Arc::new(RedirectResolver::new(
        uri("test/custom"),
        uri("test/calc"),
    ))));
    let client = WrapClient::builder()
        .add_package(uri("test/calc"), calculator())
        .add_resolver(Arc::clone(&custom) as _)
        .build();

    let resolved = client
        .try_resolve_uri(&uri("test/calc"), None)
        .await
        .expect("resolves");
    assert_eq!(resolved.kind(), "package");
    assert_eq!(custom.calls(), 0);

    let ctx = ResolutionContext::new();
    let resolved = client
        .try_resolve_uri(&uri("test/custom"), Some(&ctx))
        .await
        .expect("resolves");
    assert!(matches!(resolved, UriPackageOrWrapper::Package { .. }));
    assert_eq!(custom.calls(), 1);

    let history = serde_json::to_value(build_clean_history(&ctx.history(), Some(0)))
        .expect("serialize");
    assert_eq!(
        history,
        json!([
            "wrap://test/custom => ResolutionResultCacheResolver => uri(wrap://test/calc)",
            "wrap://test/calc => ResolutionResultCacheResolver (Cache) => package(wrap://test/calc)",
        ])
    );
}
