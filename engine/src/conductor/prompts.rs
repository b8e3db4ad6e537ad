//! Prompt templates for each pipeline stage.
//!
//! Callers pass context that is already truncated; templates embed their
//! arguments verbatim.

/// Leading marker the fast path asks the model to emit when unsure
pub const UNCERTAIN_MARKER: &str = "[UNCERTAIN]";

pub fn split_prompt(task: &str, context_excerpt: &str) -> String {
    format!(
        "Analyze this task and break it down into 2-3 smaller sub-tasks.\n\
         Return ONLY JSON with the key \"subtasks\".\n\n\
         TASK: {task}\n\n\
         CONTEXT (first characters): {context_excerpt}...\n\n\
         Answer ONLY in JSON:"
    )
}

pub fn subtask_prompt(subtask: &str, context_excerpt: &str) -> String {
    format!(
        "Solve this sub-task concisely.\n\n\
         TASK: {subtask}\n\n\
         CONTEXT:\n{context_excerpt}\n\n\
         Answer ONLY with the solution, without unnecessary explanations."
    )
}

/// Aggregation prompt over `(subtask, result excerpt)` pairs, numbered from 1.
pub fn aggregation_prompt(original_task: &str, pairs: &[(&str, &str)]) -> String {
    let mut prompt = format!(
        "Aggregate these results into one coherent answer.\n\n\
         ORIGINAL TASK: {original_task}\n\n\
         RESULTS:\n"
    );

    for (i, (subtask, excerpt)) in pairs.iter().enumerate() {
        prompt.push_str(&format!("\n[{}] {}\n    -> {}\n", i + 1, subtask, excerpt));
    }

    prompt.push_str("\nReturn a clear final answer:");
    prompt
}

pub fn fast_path_prompt(task: &str, context_excerpt: &str) -> String {
    format!(
        "Answer this question QUICKLY and with CONFIDENCE.\n\
         If you are ABSOLUTELY CERTAIN (100%) that you know the answer, answer directly.\n\
         If you have any doubt, start your answer with {UNCERTAIN_MARKER}.\n\n\
         QUESTION: {task}\n\n\
         CONTEXT: {context_excerpt}\n\n\
         Answer CONCISELY:"
    )
}
