//! Store Module Tests
//!
//! Exercises the request lifecycle (add/pick/remove/insert-handling), the
//! busyness accounting, and the acceptance-priority rules against the
//! node's own function table and cost configuration.

#[cfg(test)]
mod tests {
    use crate::config::{CostRule, CostTable, MeshConfig};
    use crate::executor::registry::FunctionRegistry;
    use crate::membership::types::NodeName;
    use crate::store::store::RequestStore;
    use crate::store::types::{Request, RequestId};
    use serde_json::json;
    use std::sync::Arc;

    fn request(module: &str, function: &str, args: Vec<serde_json::Value>) -> Request {
        Request::new(
            NodeName("127.0.0.1:7000".to_string()),
            "caller-1".to_string(),
            module,
            function,
            args,
        )
    }

    fn rule_table(module: &str, function: &str, rule: CostRule) -> CostTable {
        let mut table = CostTable::new();
        table
            .entry(module.to_string())
            .or_default()
            .insert(function.to_string(), rule);
        table
    }

    /// A store whose node resolves `math.square/1` and `strings.upcase/1`.
    fn capable_store(config: MeshConfig) -> Arc<RequestStore> {
        let functions = FunctionRegistry::new();
        functions.register("math", "square", 1, |args| async move {
            let n = args[0].as_i64().unwrap_or(0);
            Ok(json!(n * n))
        });
        functions.register("strings", "upcase", 1, |args| async move {
            Ok(json!(args[0].as_str().unwrap_or("").to_uppercase()))
        });

        RequestStore::new(functions, Arc::new(config))
    }

    // ============================================================
    // TEST 1: Lifecycle - add / pick / remove
    // ============================================================

    #[tokio::test]
    async fn test_add_is_idempotent_on_id() {
        let store = capable_store(MeshConfig::default());

        let req = request("math", "square", vec![json!(2)]);
        store.add(req.clone()).await;
        store.add(req.clone()).await;

        let pending = store.get_pending().await;
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, req.id);
    }

    #[tokio::test]
    async fn test_request_never_in_both_lists() {
        let store = capable_store(MeshConfig::default());

        let req = request("math", "square", vec![json!(2)]);
        store.add(req.clone()).await;
        store.pick(&req.id).await.expect("pick pending request");

        let (pending, handling) = store.get().await;
        assert!(pending.is_empty());
        assert_eq!(handling.len(), 1);

        // Re-adding the same id pulls it back out of handling.
        store.add(req.clone()).await;
        let (pending, handling) = store.get().await;
        assert_eq!(pending.len(), 1);
        assert!(handling.is_empty());
    }

    #[tokio::test]
    async fn test_pick_unknown_id_errors() {
        let store = capable_store(MeshConfig::default());

        let result = store.pick(&RequestId::new()).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_pick_already_handled_errors() {
        let store = capable_store(MeshConfig::default());

        let req = request("math", "square", vec![json!(2)]);
        store.add(req.clone()).await;
        store.pick(&req.id).await.expect("first pick");

        // The id now lives in handling, not pending: a second pick is a
        // lost race.
        assert!(store.pick(&req.id).await.is_err());
    }

    #[tokio::test]
    async fn test_remove_clears_both_lists_and_tolerates_absence() {
        let store = capable_store(MeshConfig::default());

        let picked = request("math", "square", vec![json!(2)]);
        let waiting = request("math", "square", vec![json!(3)]);
        store.add(picked.clone()).await;
        store.add(waiting.clone()).await;
        store.pick(&picked.id).await.expect("pick");

        store.remove(&picked.id).await;
        store.remove(&waiting.id).await;
        store.remove(&RequestId::new()).await; // absent: no-op

        let (pending, handling) = store.get().await;
        assert!(pending.is_empty());
        assert!(handling.is_empty());
    }

    #[tokio::test]
    async fn test_insert_handling_replaces_same_id() {
        let store = capable_store(MeshConfig::default());

        let req = request("math", "square", vec![json!(2)]);
        store.add(req.clone()).await;

        // A delegation push for an id we already track supersedes it.
        store.insert_handling(req.clone()).await;

        let (pending, handling) = store.get().await;
        assert!(pending.is_empty());
        assert_eq!(handling.len(), 1);

        store.insert_handling(req.clone()).await;
        assert_eq!(store.get_handling().await.len(), 1);
    }

    #[tokio::test]
    async fn test_get_one_finds_request_in_either_list() {
        let store = capable_store(MeshConfig::default());

        let req = request("math", "square", vec![json!(2)]);
        store.add(req.clone()).await;
        assert!(store.get_one(&req.id).await.is_some());

        store.pick(&req.id).await.expect("pick");
        assert!(store.get_one(&req.id).await.is_some());

        store.remove(&req.id).await;
        assert!(store.get_one(&req.id).await.is_none());
    }

    // ============================================================
    // TEST 2: Base busyness
    // ============================================================

    #[tokio::test]
    async fn test_base_busyness_bumps() {
        let store = capable_store(MeshConfig::default());
        assert_eq!(store.base_busyness().await, 0);

        // The no-argument variants bump by the default step of 100.
        store.base_busyness_increase().await;
        store.base_busyness_increase().await;
        store.base_busyness_decrease_by(50).await;

        assert_eq!(store.base_busyness().await, 150);

        // Negative base is allowed: it makes a node extra eager.
        store.base_busyness_decrease_by(500).await;
        assert_eq!(store.base_busyness().await, -350);

        store.base_busyness_decrease().await;
        assert_eq!(store.base_busyness().await, -450);
    }

    // ============================================================
    // TEST 3: Busyness accounting
    // ============================================================

    #[tokio::test]
    async fn test_busyness_sums_handled_weights_over_base() {
        let config = MeshConfig {
            busyness_weights: rule_table("math", "square", CostRule::Cost(30)),
            ..MeshConfig::default()
        };
        let store = capable_store(config);
        store.base_busyness_increase_by(1000).await;

        let weighted = request("math", "square", vec![json!(2)]);
        let defaulted = request("strings", "upcase", vec![json!("hi")]);
        store.add(weighted.clone()).await;
        store.add(defaulted.clone()).await;
        store.pick(&weighted.id).await.expect("pick");
        store.pick(&defaulted.id).await.expect("pick");

        // base 1000 + configured 30 + default 100; pending contributes nothing.
        assert_eq!(store.busyness().await, 1130);
    }

    #[tokio::test]
    async fn test_busyness_weight_rules() {
        let mut weights = rule_table("math", "square", CostRule::Cost(30));
        weights
            .entry("strings".to_string())
            .or_default()
            .insert("upcase".to_string(), CostRule::Reject);
        let config = MeshConfig {
            busyness_weights: weights,
            ..MeshConfig::default()
        };
        let store = capable_store(config);

        assert_eq!(
            store.busyness_weight(&request("math", "square", vec![json!(2)])),
            Some(30)
        );
        assert_eq!(
            store.busyness_weight(&request("strings", "upcase", vec![json!("x")])),
            None
        );
        // Resolvable but unconfigured functions cost the default.
        let store = capable_store(MeshConfig::default());
        assert_eq!(
            store.busyness_weight(&request("math", "square", vec![json!(2)])),
            Some(100)
        );
        // Unresolvable requests carry no weight at all.
        assert_eq!(
            store.busyness_weight(&request("math", "cube", vec![json!(2)])),
            None
        );
    }

    // ============================================================
    // TEST 4: Acceptance priority
    // ============================================================

    #[tokio::test]
    async fn test_acceptance_priority_unresolvable_is_none() {
        let store = capable_store(MeshConfig::default());

        // Unknown function.
        assert_eq!(
            store
                .acceptance_priority(&request("math", "cube", vec![json!(2)]))
                .await,
            None
        );
        // Known function, wrong arity.
        assert_eq!(
            store
                .acceptance_priority(&request("math", "square", vec![json!(2), json!(3)]))
                .await,
            None
        );
    }

    #[tokio::test]
    async fn test_acceptance_priority_negates_base_busyness() {
        let store = capable_store(MeshConfig::default());
        store.base_busyness_increase_by(100).await;

        assert_eq!(
            store
                .acceptance_priority(&request("math", "square", vec![json!(2)]))
                .await,
            Some(-100)
        );
    }

    #[tokio::test]
    async fn test_acceptance_priority_applies_offset() {
        let config = MeshConfig {
            busyness_offsets: rule_table("math", "square", CostRule::Cost(40)),
            ..MeshConfig::default()
        };
        let store = capable_store(config);
        store.base_busyness_increase_by(100).await;

        assert_eq!(
            store
                .acceptance_priority(&request("math", "square", vec![json!(2)]))
                .await,
            Some(-140)
        );
    }

    #[tokio::test]
    async fn test_acceptance_priority_reject_offset_is_none() {
        let config = MeshConfig {
            busyness_offsets: rule_table("math", "square", CostRule::Reject),
            ..MeshConfig::default()
        };
        let store = capable_store(config);

        assert_eq!(
            store
                .acceptance_priority(&request("math", "square", vec![json!(2)]))
                .await,
            None
        );
        // Other functions are unaffected by the rejection.
        assert_eq!(
            store
                .acceptance_priority(&request("strings", "upcase", vec![json!("x")]))
                .await,
            Some(0)
        );
    }

    #[tokio::test]
    async fn test_less_busy_node_scores_higher() {
        let busy = capable_store(MeshConfig::default());
        busy.base_busyness_increase_by(1000).await;
        let idle = capable_store(MeshConfig::default());

        let req = request("math", "square", vec![json!(2)]);
        let busy_score = busy.acceptance_priority(&req).await.expect("eligible");
        let idle_score = idle.acceptance_priority(&req).await.expect("eligible");

        assert!(idle_score > busy_score);
    }

    // ============================================================
    // TEST 5: Wire format
    // ============================================================

    #[test]
    fn test_request_serialization_round_trip() {
        let req = request("math", "square", vec![json!(7), json!("tag")]);

        let encoded = serde_json::to_string(&req).expect("serialize");
        let restored: Request = serde_json::from_str(&encoded).expect("deserialize");

        assert_eq!(restored.id, req.id);
        assert_eq!(restored.origin_node, req.origin_node);
        assert_eq!(restored.caller_handle, "caller-1");
        assert_eq!(restored.module, "math");
        assert_eq!(restored.function, "square");
        assert_eq!(restored.args, vec![json!(7), json!("tag")]);
        assert_eq!(restored.arity(), 2);
    }

    #[test]
    fn test_request_ids_are_unique() {
        assert_ne!(RequestId::new(), RequestId::new());
    }
}
