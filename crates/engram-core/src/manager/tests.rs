//! Tests for the agent cache manager

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;

use super::*;
use crate::cache::eviction::EvictionPolicyKind;

fn test_manager() -> AgentCacheManager {
    let config = CacheConfig::default().with_cleanup_interval(Duration::ZERO);
    AgentCacheManager::new(Arc::new(MemoryStore::new()), config)
}

#[tokio::test]
async fn test_response_round_trip() {
    let manager = test_manager();
    let params = ResponseParams::new("gpt-4");

    assert!(
        manager
            .cache_response("agentA", "hi", "hello!", &params, Some(Duration::from_secs(3600)))
            .await
    );

    let cached = manager.get_cached_response("agentA", "hi", &params).await;
    assert_eq!(cached, Some(json!("hello!")));
}

#[tokio::test]
async fn test_response_params_partition_the_key_space() {
    let manager = test_manager();
    let gpt4 = ResponseParams::new("gpt-4");

    manager.cache_response("agentA", "hi", "hello!", &gpt4, None).await;

    assert!(
        manager
            .get_cached_response("agentA", "hi", &ResponseParams::new("gpt-3.5"))
            .await
            .is_none()
    );
    assert!(
        manager
            .get_cached_response("agentA", "hi", &gpt4.clone().with_temperature(0.2))
            .await
            .is_none()
    );
    assert!(manager.get_cached_response("agentB", "hi", &gpt4).await.is_none());
    assert!(manager.get_cached_response("agentA", "hi", &gpt4).await.is_some());
}

#[tokio::test]
async fn test_invalidate_agent_cache() {
    let manager = test_manager();
    let params = ResponseParams::new("gpt-4");

    for input in ["one", "two", "three"] {
        manager.cache_response("agent1", input, input, &params, None).await;
    }
    manager.cache_response("agent2", "kept", "kept", &params, None).await;

    let removed = manager.invalidate_agent_cache("agent1").await;
    assert_eq!(removed, 3);

    for input in ["one", "two", "three"] {
        assert!(manager.get_cached_response("agent1", input, &params).await.is_none());
    }
    assert!(manager.get_cached_response("agent2", "kept", &params).await.is_some());
}

#[tokio::test]
async fn test_invalidate_model_cache() {
    let manager = test_manager();
    let gpt4 = ResponseParams::new("gpt-4");
    let gpt35 = ResponseParams::new("gpt-3.5");

    manager.cache_response("agent1", "hi", "a", &gpt4, None).await;
    manager.cache_response("agent2", "hi", "b", &gpt4, None).await;
    manager.cache_response("agent1", "hi", "c", &gpt35, None).await;

    let removed = manager.invalidate_model_cache("gpt-4").await;
    assert_eq!(removed, 2);

    assert!(manager.get_cached_response("agent1", "hi", &gpt4).await.is_none());
    assert!(manager.get_cached_response("agent1", "hi", &gpt35).await.is_some());
}

#[tokio::test]
async fn test_response_ttl_expiry() {
    let manager = test_manager();
    let params = ResponseParams::new("gpt-4");

    manager
        .cache_response("agentA", "hi", "hello!", &params, Some(Duration::from_millis(50)))
        .await;
    assert!(manager.get_cached_response("agentA", "hi", &params).await.is_some());

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(manager.get_cached_response("agentA", "hi", &params).await.is_none());
}

#[tokio::test]
async fn test_embedding_round_trip() {
    let manager = test_manager();
    let embedding = json!([0.1, 0.2, 0.3]);

    assert!(manager.cache_embedding("some text", "ada-002", &embedding, None).await);

    assert_eq!(
        manager.get_cached_embedding("some text", "ada-002").await,
        Some(embedding)
    );
    assert!(manager.get_cached_embedding("some text", "ada-003").await.is_none());
    assert!(manager.get_cached_embedding("other text", "ada-002").await.is_none());
}

#[tokio::test]
async fn test_computation_round_trip() {
    let manager = test_manager();
    let params = json!({"a": "x", "b": "y"});

    assert!(manager.get_cached_computation("sim", &params).await.is_none());

    manager
        .cache_computation("sim", &params, &json!({"score": 0.9}), None)
        .await;

    assert_eq!(
        manager.get_cached_computation("sim", &params).await,
        Some(json!({"score": 0.9}))
    );
    // Same parameters in a different key order address the same entry
    assert!(
        manager
            .get_cached_computation("sim", &json!({"b": "y", "a": "x"}))
            .await
            .is_some()
    );
    assert!(
        manager
            .get_cached_computation("sim", &json!({"a": "x", "b": "z"}))
            .await
            .is_none()
    );
}

#[tokio::test]
async fn test_warm_cache_skips_existing_entries() {
    let manager = test_manager();
    let params = ResponseParams::new("gpt-4");

    manager.cache_response("agent1", "hello", "cached", &params, None).await;

    let inputs = vec!["hello".to_string(), "goodbye".to_string()];
    let mut produced = 0;
    let warmed = manager
        .warm_cache("agent1", &inputs, "gpt-4", |input| {
            produced += 1;
            json!(format!("warmed:{input}"))
        })
        .await;

    assert_eq!(warmed, 1);
    assert_eq!(produced, 1);
    assert_eq!(
        manager.get_cached_response("agent1", "hello", &params).await,
        Some(json!("cached"))
    );
    assert_eq!(
        manager.get_cached_response("agent1", "goodbye", &params).await,
        Some(json!("warmed:goodbye"))
    );
}

#[tokio::test]
async fn test_periodic_cleanup_removes_expired_entries() {
    let manager = test_manager();
    let params = ResponseParams::new("gpt-4");

    manager
        .cache_response("agent1", "short", "gone", &params, Some(Duration::from_millis(50)))
        .await;
    manager.cache_response("agent1", "long", "kept", &params, None).await;

    tokio::time::sleep(Duration::from_millis(100)).await;

    let report = manager.periodic_cleanup().await;
    assert_eq!(report.expired_removed, 1);
    assert_eq!(report.evicted, 0);
    assert_eq!(manager.cache_stats().await.entry_count, 1);
}

#[tokio::test]
async fn test_periodic_cleanup_evicts_over_capacity() {
    let config = CacheConfig::default()
        .with_max_size_bytes(1024)
        .with_eviction_policy(EvictionPolicyKind::Lru)
        .with_cleanup_interval(Duration::ZERO);
    let manager = AgentCacheManager::new(Arc::new(MemoryStore::new()), config);
    let params = ResponseParams::new("gpt-4");

    // Ten entries around 200 bytes each, roughly double the capacity
    let payload = "x".repeat(200);
    for i in 0..10 {
        manager
            .cache_response("agent1", &format!("input-{i}"), &payload, &params, None)
            .await;
    }
    assert!(manager.cache_stats().await.total_size_bytes > 1024);

    let report = manager.periodic_cleanup().await;
    assert!(report.evicted > 0);

    let stats = manager.cache_stats().await;
    assert!(stats.total_size_bytes <= 1024);
    assert_eq!(stats.evictions, report.evicted as u64);
}

#[tokio::test]
async fn test_periodic_cleanup_is_rate_limited() {
    let config = CacheConfig::default().with_cleanup_interval(Duration::from_secs(300));
    let manager = AgentCacheManager::new(Arc::new(MemoryStore::new()), config);
    let params = ResponseParams::new("gpt-4");

    manager
        .cache_response("agent1", "short", "gone", &params, Some(Duration::from_millis(50)))
        .await;
    tokio::time::sleep(Duration::from_millis(100)).await;

    let first = manager.periodic_cleanup().await;
    assert_eq!(first.expired_removed, 1);

    // A fresh expired entry inside the interval is left for the next window
    manager
        .cache_response("agent1", "short2", "gone", &params, Some(Duration::from_millis(10)))
        .await;
    tokio::time::sleep(Duration::from_millis(50)).await;

    let second = manager.periodic_cleanup().await;
    assert_eq!(second, CleanupReport::default());
}

#[tokio::test]
async fn test_cache_stats_reflect_traffic() {
    let manager = test_manager();
    let params = ResponseParams::new("gpt-4");

    manager.get_cached_response("agent1", "hi", &params).await;
    manager.cache_response("agent1", "hi", "hello!", &params, None).await;
    manager.get_cached_response("agent1", "hi", &params).await;
    manager.get_cached_response("agent1", "hi", &params).await;

    let stats = manager.cache_stats().await;
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.hits, 2);
    assert_eq!(stats.total_requests, 3);
    assert!((stats.hit_ratio - 2.0 / 3.0).abs() < 0.01);
}

#[tokio::test]
async fn test_builder_defaults_to_memory_store() {
    let manager = AgentCacheManagerBuilder::new()
        .with_config(CacheConfig::default().with_namespace_prefix("test_cache"))
        .build();
    let params = ResponseParams::new("gpt-4");

    manager.cache_response("agent1", "hi", "hello!", &params, None).await;
    assert!(manager.get_cached_response("agent1", "hi", &params).await.is_some());
}
