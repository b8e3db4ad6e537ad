//! Conductor orchestrators
//!
//! `Conductor` runs the full pipeline: split, process every sub-task in
//! order, aggregate. `SmartConductor` tries the fast path first and only
//! falls back to the full pipeline when the estimate does not clear the
//! confidence threshold.
//!
//! Inference calls are issued strictly one at a time. No stage propagates a
//! failure; each one degrades its own output instead.

use crate::conductor::aggregator::Aggregator;
use crate::conductor::fast_path::FastPath;
use crate::conductor::processor::Processor;
use crate::conductor::sanitizer::truncate_chars;
use crate::conductor::splitter::Splitter;
use crate::conductor::types::{PipelineLimits, PipelineState};
use crate::llm::InferenceClient;
use sdk::{Confidence, Mode, ResultRecord};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tracing::{debug, info};

/// Default confidence required for an early exit
pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.90;

fn transition(from: PipelineState, to: PipelineState) {
    debug!("Pipeline state: {} -> {}", from, to);
}

/// Baseline pipeline: split -> process each -> aggregate
pub struct Conductor {
    splitter: Splitter,
    processor: Processor,
    aggregator: Aggregator,
    call_count: AtomicU64,
}

impl Conductor {
    pub fn new(client: InferenceClient, limits: PipelineLimits) -> Self {
        Self {
            splitter: Splitter::new(client.clone(), limits.split_context_chars),
            processor: Processor::new(client.clone(), limits.subtask_context_chars),
            aggregator: Aggregator::new(client, limits.result_excerpt_chars),
            call_count: AtomicU64::new(0),
        }
    }

    /// Number of `run` invocations so far
    pub fn call_count(&self) -> u64 {
        self.call_count.load(Ordering::Relaxed)
    }

    /// Run the full pipeline and return the aggregated answer.
    pub async fn run(&self, task: &str, context: &str) -> String {
        let n = self.call_count.fetch_add(1, Ordering::Relaxed) + 1;
        info!("[RLM-{}] Processing: {}...", n, truncate_chars(task, 80));
        transition(PipelineState::Start, PipelineState::FullPipeline);

        let answer = self.full_pipeline(task, context).await;

        transition(PipelineState::FullPipeline, PipelineState::Done);
        answer
    }

    async fn full_pipeline(&self, task: &str, context: &str) -> String {
        let subtasks = self.splitter.split(task, context).await;
        info!("[RLM] Split into {} sub-tasks", subtasks.len());

        let total = subtasks.len();
        let mut results = Vec::with_capacity(total);
        for (i, subtask) in subtasks.iter().enumerate() {
            info!("  [{}/{}] {}...", i + 1, total, truncate_chars(subtask, 60));
            results.push(self.processor.process(subtask, context).await);
        }

        info!("[RLM] Aggregating final results...");
        self.aggregator.aggregate(&subtasks, &results, task).await
    }
}

/// Fast path with early exit, full pipeline otherwise
pub struct SmartConductor {
    fast_path: FastPath,
    pipeline: Conductor,
    threshold: f64,
    call_count: AtomicU64,
}

impl SmartConductor {
    pub fn new(client: InferenceClient, limits: PipelineLimits) -> Self {
        Self {
            fast_path: FastPath::new(client.clone(), limits.fast_path_context_chars),
            pipeline: Conductor::new(client, limits),
            threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            call_count: AtomicU64::new(0),
        }
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn call_count(&self) -> u64 {
        self.call_count.load(Ordering::Relaxed)
    }

    pub async fn run(&self, task: &str, context: &str) -> ResultRecord {
        let start = Instant::now();
        let n = self.call_count.fetch_add(1, Ordering::Relaxed) + 1;
        info!("[SmartRLM-{}] Processing: {}...", n, truncate_chars(task, 80));

        transition(PipelineState::Start, PipelineState::FastAttempt);
        let estimate = self.fast_path.estimate(task, context).await;

        if estimate.qualifies_for_early_exit(self.threshold) {
            transition(PipelineState::FastAttempt, PipelineState::EarlyExit);
            info!("[+] Early exit, confidence {}", estimate.confidence);

            let record = ResultRecord::new(
                estimate.answer.unwrap_or_default(),
                estimate.confidence,
                Mode::Fast,
                elapsed_ms(start),
            );
            transition(PipelineState::EarlyExit, PipelineState::Done);
            return record;
        }

        transition(PipelineState::FastAttempt, PipelineState::FullPipeline);
        info!(
            "[-] Insufficient confidence ({}), running full pipeline...",
            estimate.confidence
        );
        let answer = self.pipeline.full_pipeline(task, context).await;

        transition(PipelineState::FullPipeline, PipelineState::Done);
        ResultRecord::new(answer, Confidence::Certain, Mode::Full, elapsed_ms(start))
    }
}

fn elapsed_ms(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conductor::testing::ScriptedProvider;

    #[tokio::test]
    async fn test_baseline_sequence() {
        let provider = ScriptedProvider::new()
            .reply(r#"{"subtasks": ["first", "second"]}"#)
            .reply("one")
            .reply("two")
            .reply("combined");
        let conductor = Conductor::new(provider.client(), PipelineLimits::default());

        let answer = conductor.run("task", "ctx").await;

        assert_eq!(answer, "combined");
        assert_eq!(conductor.call_count(), 1);

        let prompts = provider.prompts();
        assert_eq!(prompts.len(), 4);
        assert!(prompts[1].contains("TASK: first"));
        assert!(prompts[2].contains("TASK: second"));
        assert!(prompts[3].contains("[1] first\n    -> one"));
        assert!(prompts[3].contains("[2] second\n    -> two"));
    }

    #[tokio::test]
    async fn test_split_failure_scenario() {
        let provider = ScriptedProvider::new()
            .fail()
            .reply("partial")
            .reply("final answer");
        let conductor = Conductor::new(provider.client(), PipelineLimits::default());

        let answer = conductor.run("Summarize X", "").await;

        assert_eq!(answer, "final answer");
        let prompts = provider.prompts();
        assert_eq!(prompts.len(), 3);
        assert!(prompts[1].contains("TASK: Summarize X"));
        assert!(prompts[2].contains("[1] Summarize X\n    -> partial"));
        assert!(!prompts[2].contains("[2]"));
    }

    #[tokio::test]
    async fn test_every_call_failing_still_completes() {
        let provider = ScriptedProvider::new();
        let conductor = Conductor::new(provider.client(), PipelineLimits::default());

        let answer = conductor.run("Summarize X", "").await;

        assert!(answer.starts_with("[ERROR]"));
        assert_eq!(provider.prompts().len(), 3);
    }

    #[tokio::test]
    async fn test_smart_early_exit() {
        let provider = ScriptedProvider::new().reply("Paris");
        let smart = SmartConductor::new(provider.client(), PipelineLimits::default());

        let record = smart.run("Capital of France?", "").await;

        assert_eq!(record.mode, Mode::Fast);
        assert_eq!(record.answer, "Paris");
        assert_eq!(record.confidence, 0.95);
        assert_eq!(provider.prompts().len(), 1);
    }

    #[tokio::test]
    async fn test_smart_uncertain_runs_full_pipeline() {
        let provider = ScriptedProvider::new()
            .reply("[UNCERTAIN] maybe")
            .reply(r#"{"subtasks": ["a"]}"#)
            .reply("ra")
            .reply("done");
        let smart = SmartConductor::new(provider.client(), PipelineLimits::default());

        let record = smart.run("hard", "").await;

        assert_eq!(record.mode, Mode::Full);
        assert_eq!(record.answer, "done");
        assert_eq!(record.confidence, 0.95);
        assert_eq!(provider.prompts().len(), 4);
    }

    #[tokio::test]
    async fn test_smart_threshold_above_certain_forces_full() {
        let provider = ScriptedProvider::new()
            .reply("Paris")
            .reply(r#"{"subtasks": ["a"]}"#)
            .reply("ra")
            .reply("done");
        let smart = SmartConductor::new(provider.client(), PipelineLimits::default())
            .with_threshold(0.96);

        let record = smart.run("Capital of France?", "").await;

        assert_eq!(record.mode, Mode::Full);
        assert_eq!(smart.call_count(), 1);
    }

    #[tokio::test]
    async fn test_smart_low_threshold_accepts_uncertain() {
        let provider = ScriptedProvider::new().reply("[UNCERTAIN] maybe");
        let smart = SmartConductor::new(provider.client(), PipelineLimits::default())
            .with_threshold(0.5);

        let record = smart.run("hard", "").await;

        assert_eq!(record.mode, Mode::Fast);
        assert_eq!(record.answer, "maybe");
        assert_eq!(record.confidence, 0.5);
    }
}
