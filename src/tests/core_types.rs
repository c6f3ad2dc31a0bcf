// Unit Tests for Core Wire Types
//
// UNIT UNDER TEST: TokenUsage, MemoryMetrics, GpuMetrics
//
// BUSINESS RESPONSIBILITY:
//   - Totals token usage without trusting upstream counts to stay small
//   - Serializes host metrics with the keys the dashboards read
//
// TEST COVERAGE:
//   - Usage totals saturate instead of overflowing
//   - OpenAI usage with a missing total falls back to the saturating sum
//   - Memory and GPU sizes serialize as `...GB`

use crate::core_types::{GpuMetrics, MemoryMetrics, TokenUsage};
use crate::providers::openai_shared::OpenAIUsage;
use serde_json::json;

mod token_usage_tests {
    use super::*;

    #[test]
    fn test_total_is_sum_of_counts() {
        let usage = TokenUsage::new(12, 3);
        assert_eq!(usage.total_tokens, 15);
    }

    #[test]
    fn test_total_saturates_on_huge_counts() {
        // Act
        let usage = TokenUsage::new(u32::MAX, 1);

        // Assert
        assert_eq!(usage.prompt_tokens, u32::MAX);
        assert_eq!(usage.completion_tokens, 1);
        assert_eq!(usage.total_tokens, u32::MAX);
    }

    #[test]
    fn test_openai_usage_without_total_saturates() {
        let usage = TokenUsage::from(OpenAIUsage {
            prompt_tokens: u32::MAX,
            completion_tokens: u32::MAX,
            total_tokens: 0,
        });

        assert_eq!(usage.total_tokens, u32::MAX);
    }

    #[test]
    fn test_openai_usage_keeps_reported_total() {
        let usage = TokenUsage::from(OpenAIUsage {
            prompt_tokens: 10,
            completion_tokens: 5,
            total_tokens: 16,
        });

        assert_eq!(usage.total_tokens, 16);
    }
}

mod metrics_serialization_tests {
    use super::*;

    #[test]
    fn test_memory_uses_gb_keys() {
        let memory = MemoryMetrics {
            total_gb: 32.0,
            used_gb: 8.0,
            percent_used: 25.0,
        };

        let value = serde_json::to_value(&memory).unwrap();

        assert_eq!(
            value,
            json!({"totalGB": 32.0, "usedGB": 8.0, "percentUsed": 25.0})
        );
    }

    #[test]
    fn test_gpu_uses_gb_keys() {
        let gpu = GpuMetrics {
            available: true,
            memory_used_gb: Some(8.0),
            memory_total_gb: Some(24.0),
            memory_percent: Some(33.3),
            ..GpuMetrics::default()
        };

        let value = serde_json::to_value(&gpu).unwrap();

        assert_eq!(value["memoryUsedGB"], 8.0);
        assert_eq!(value["memoryTotalGB"], 24.0);
        assert_eq!(value["memoryPercent"], 33.3);
        assert!(value.get("memoryUsedGb").is_none());
    }

    #[test]
    fn test_gpu_without_device_omits_sizes() {
        let value = serde_json::to_value(GpuMetrics::default()).unwrap();
        assert_eq!(value, json!({"available": false}));
    }

    #[test]
    fn test_memory_round_trips_through_gb_keys() {
        let parsed: MemoryMetrics =
            serde_json::from_value(json!({"totalGB": 16.0, "usedGB": 4.0, "percentUsed": 25.0}))
                .unwrap();

        assert_eq!(parsed.total_gb, 16.0);
        assert_eq!(parsed.used_gb, 4.0);
    }
}
