//! Executor Module Tests
//!
//! Covers the callable registry, the executor-selection rule used by the
//! assignment task, the response router, and the envelope wire format.

#[cfg(test)]
mod tests {
    use crate::executor::assign::select_executor;
    use crate::executor::caller::ResponseRouter;
    use crate::executor::protocol::{CallResponse, ResponseEnvelope};
    use crate::executor::registry::FunctionRegistry;
    use crate::membership::types::NodeName;
    use crate::store::types::{Request, RequestId};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn name(s: &str) -> NodeName {
        NodeName(s.to_string())
    }

    fn request(module: &str, function: &str, args: Vec<serde_json::Value>) -> Request {
        Request::new(
            name("127.0.0.1:7000"),
            "caller-1".to_string(),
            module,
            function,
            args,
        )
    }

    // ============================================================
    // TEST 1: FunctionRegistry - registration and invocation
    // ============================================================

    #[tokio::test]
    async fn test_registry_register_and_invoke() {
        let registry = FunctionRegistry::new();
        let call_count = Arc::new(AtomicUsize::new(0));
        let call_count_clone = call_count.clone();

        registry.register("math", "square", 1, move |args| {
            let count = call_count_clone.clone();
            async move {
                count.fetch_add(1, Ordering::SeqCst);
                let n = args[0].as_i64().unwrap_or(0);
                Ok(json!(n * n))
            }
        });

        assert!(registry.resolves("math", "square", 1));
        assert_eq!(registry.len(), 1);

        let result = registry
            .invoke(&request("math", "square", vec![json!(7)]))
            .await
            .expect("invoke");

        assert_eq!(result, json!(49));
        assert_eq!(call_count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_registry_resolution_is_arity_aware() {
        let registry = FunctionRegistry::new();
        registry.register("math", "square", 1, |args| async move {
            Ok(args.into_iter().next().unwrap_or(serde_json::Value::Null))
        });

        assert!(registry.resolves("math", "square", 1));
        assert!(!registry.resolves("math", "square", 2));
        assert!(!registry.resolves("math", "cube", 1));
        assert!(!registry.resolves("physics", "square", 1));
    }

    #[tokio::test]
    async fn test_registry_unknown_callable_errors() {
        let registry = FunctionRegistry::new();

        let result = registry
            .invoke(&request("math", "square", vec![json!(7)]))
            .await;

        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("no callable for math.square/1"));
    }

    #[tokio::test]
    async fn test_registry_callable_can_fail() {
        let registry = FunctionRegistry::new();
        registry.register("math", "fail", 0, |_args| async move {
            Err(anyhow::anyhow!("intentional failure"))
        });

        let result = registry.invoke(&request("math", "fail", vec![])).await;

        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("intentional failure"));
    }

    // ============================================================
    // TEST 2: Executor selection
    // ============================================================

    #[test]
    fn test_select_executor_takes_maximum_score() {
        let winner = select_executor(vec![
            (name("a"), Some(-1000)),
            (name("b"), Some(0)),
            (name("c"), Some(-50)),
        ]);

        assert_eq!(winner, Some(name("b")));
    }

    #[test]
    fn test_select_executor_ignores_ineligible_nodes() {
        let winner = select_executor(vec![
            (name("a"), None),
            (name("b"), Some(-200)),
            (name("c"), None),
        ]);

        assert_eq!(winner, Some(name("b")));
    }

    #[test]
    fn test_select_executor_empty_when_nobody_eligible() {
        assert_eq!(select_executor(vec![(name("a"), None)]), None);
        assert_eq!(select_executor(vec![]), None);
    }

    #[test]
    fn test_select_executor_tie_break_is_deterministic() {
        let scores = vec![
            (name("a"), Some(0)),
            (name("c"), Some(0)),
            (name("b"), Some(0)),
        ];

        // Same scores in any order must elect the same node.
        let mut reversed = scores.clone();
        reversed.reverse();

        assert_eq!(select_executor(scores), Some(name("c")));
        assert_eq!(select_executor(reversed), Some(name("c")));
    }

    // ============================================================
    // TEST 3: ResponseRouter
    // ============================================================

    #[tokio::test]
    async fn test_router_delivers_to_registered_caller() {
        let router = ResponseRouter::new();
        let rx = router.register("caller-1");

        router.deliver(
            "caller-1",
            ResponseEnvelope::Response {
                id: RequestId::new(),
                node: name("b"),
                result: json!(49),
            },
        );

        match rx.await.expect("envelope delivered") {
            ResponseEnvelope::Response { result, node, .. } => {
                assert_eq!(result, json!(49));
                assert_eq!(node, name("b"));
            }
            other => panic!("unexpected envelope: {:?}", other),
        }
        assert_eq!(router.waiting_count(), 0);
    }

    #[tokio::test]
    async fn test_router_drops_envelope_for_unknown_caller() {
        let router = ResponseRouter::new();

        // Nobody is waiting: the late response vanishes without effect.
        router.deliver(
            "gone",
            ResponseEnvelope::Response {
                id: RequestId::new(),
                node: name("b"),
                result: json!("late"),
            },
        );

        assert_eq!(router.waiting_count(), 0);
    }

    #[tokio::test]
    async fn test_router_forget_abandons_channel() {
        let router = ResponseRouter::new();
        let rx = router.register("caller-1");
        router.forget("caller-1");

        assert_eq!(router.waiting_count(), 0);
        assert!(rx.await.is_err());
    }

    // ============================================================
    // TEST 4: Envelope wire format
    // ============================================================

    #[test]
    fn test_response_envelope_serialization() {
        let envelope = ResponseEnvelope::Response {
            id: RequestId("req-1".to_string()),
            node: name("127.0.0.1:7001"),
            result: json!({"answer": 42}),
        };

        let encoded = serde_json::to_string(&envelope).expect("serialize");
        assert!(encoded.contains("\"kind\":\"response\""));

        let restored: ResponseEnvelope = serde_json::from_str(&encoded).expect("deserialize");
        match restored {
            ResponseEnvelope::Response { id, node, result } => {
                assert_eq!(id, RequestId("req-1".to_string()));
                assert_eq!(node, name("127.0.0.1:7001"));
                assert_eq!(result, json!({"answer": 42}));
            }
            other => panic!("unexpected envelope: {:?}", other),
        }
    }

    #[test]
    fn test_error_envelope_carries_request_and_reason() {
        let req = request("math", "square", vec![json!(7)]);
        let envelope = ResponseEnvelope::Error {
            request: req.clone(),
            node: name("127.0.0.1:7001"),
            reason: "boom".to_string(),
        };

        let encoded = serde_json::to_string(&envelope).expect("serialize");
        assert!(encoded.contains("\"kind\":\"error\""));

        let restored: ResponseEnvelope = serde_json::from_str(&encoded).expect("deserialize");
        match restored {
            ResponseEnvelope::Error { request, node, reason } => {
                assert_eq!(request.id, req.id);
                assert_eq!(node, name("127.0.0.1:7001"));
                assert_eq!(reason, "boom");
            }
            other => panic!("unexpected envelope: {:?}", other),
        }
    }

    #[test]
    fn test_call_response_status_tags() {
        let ok = CallResponse::Ok {
            result: json!(1),
            executing_node: name("a"),
        };
        assert!(serde_json::to_string(&ok)
            .unwrap()
            .contains("\"status\":\"ok\""));

        let timeout = CallResponse::Timeout;
        assert!(serde_json::to_string(&timeout)
            .unwrap()
            .contains("\"status\":\"timeout\""));
    }
}
