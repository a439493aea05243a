//! Integration test against the real Bedrock runtime.
//!
//! Requires valid AWS credentials in the environment and a model id in
//! `MCHAT_MODEL_ID`.
//!
//! Run with: `cargo test -p mchat-bedrock --test bedrock_live -- --ignored`

use mchat_bedrock::generate::{BedrockGenerator, TextGenerator};

#[tokio::test]
#[ignore]
async fn converse_returns_text() {
    let config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(aws_config::Region::new("us-east-1"))
        .load()
        .await;
    let model_id = std::env::var("MCHAT_MODEL_ID").expect("MCHAT_MODEL_ID must be set");
    let generator = BedrockGenerator::new(&config, &model_id)
        .expect("generator should build")
        .with_max_tokens(64);

    let generation = generator
        .generate("Reply with the single word: ready")
        .await
        .expect("converse should succeed");

    println!("{} ({} tokens)", generation.text, generation.usage.total());
    assert!(!generation.text.is_empty());
}
