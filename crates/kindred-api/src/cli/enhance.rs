//! `kindred enhance`: rewrite a short persona prompt.

use anyhow::Result;
use console::style;

use kindred_core::enhance::PromptEnhancer;

use crate::cli::agent::spinner;
use crate::state::AppState;

pub async fn enhance(state: &AppState, prompt: &str, json: bool) -> Result<()> {
    let spinner = spinner("Enhancing prompt...");
    let result = PromptEnhancer::enhance(
        &state.provider,
        prompt,
        state.config.enhancer_model.as_deref(),
    )
    .await;
    spinner.finish_and_clear();
    let enhanced = result?;

    if json {
        println!("{}", serde_json::json!({ "enhanced_prompt": enhanced }));
    } else {
        println!();
        println!("  {}", style("── Enhanced prompt ──").dim());
        for line in enhanced.lines() {
            println!("  {line}");
        }
        println!();
    }
    Ok(())
}
