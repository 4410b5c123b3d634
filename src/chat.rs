// src/chat.rs

use crate::api::Generator;
use crate::conversation::{Conversation, Turn};
use crate::errors::ChatResult;
use crate::models::Generation;
use log::{debug, info};

/// A user turn that has been recorded but not yet answered.
#[derive(Debug)]
pub struct PendingTurn {
    prompt: String,
}

impl PendingTurn {
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Sends the prompt to the generator. Only the newest prompt is sent;
    /// earlier turns are not forwarded.
    pub async fn resolve<G>(self, generator: &G) -> ChatResult<Generation>
    where
        G: Generator + ?Sized,
    {
        let generation = generator.generate(&self.prompt).await?;
        if let Some(usage) = generation.usage {
            info!(
                "Tokens used - Input: {}, Output: {}, Total: {}",
                usage.input_tokens,
                usage.output_tokens,
                usage.total()
            );
        }
        Ok(generation)
    }
}

/// Appends the user turn and hands back the pending request.
pub fn begin_turn(conversation: &mut Conversation, text: &str) -> PendingTurn {
    conversation.push(Turn::user(text));
    debug!("user turn recorded ({} turns)", conversation.len());
    PendingTurn {
        prompt: text.to_string(),
    }
}

/// Appends the model's reply.
pub fn complete_turn(conversation: &mut Conversation, generation: &Generation) {
    conversation.push(Turn::model(generation.text.clone()));
}

/// Records `text`, asks the generator for a reply and records that too.
///
/// On failure the user turn stays in place and no model turn is added.
pub async fn submit<G>(conversation: &mut Conversation, generator: &G, text: &str) -> ChatResult<()>
where
    G: Generator + ?Sized,
{
    let pending = begin_turn(conversation, text);
    let generation = pending.resolve(generator).await?;
    complete_turn(conversation, &generation);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::Role;
    use crate::errors::ChatError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Replies with a transformed prompt and records every call.
    struct ShoutingGenerator {
        calls: Mutex<Vec<String>>,
    }

    impl ShoutingGenerator {
        fn new() -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Generator for ShoutingGenerator {
        async fn generate(&self, prompt: &str) -> ChatResult<Generation> {
            self.calls.lock().unwrap().push(prompt.to_string());
            Ok(Generation::from_text(prompt.to_uppercase()))
        }
    }

    struct FailingGenerator;

    #[async_trait]
    impl Generator for FailingGenerator {
        async fn generate(&self, _prompt: &str) -> ChatResult<Generation> {
            Err(ChatError::api_error("service unavailable"))
        }
    }

    #[tokio::test]
    async fn test_submissions_produce_ordered_pairs() {
        let generator = ShoutingGenerator::new();
        let mut conversation = Conversation::new();
        let inputs = ["hello", "what is up?", "bye"];

        for input in inputs {
            submit(&mut conversation, &generator, input).await.unwrap();
        }

        assert_eq!(conversation.len(), inputs.len() * 2);
        for (pair, input) in conversation.turns().chunks(2).zip(inputs) {
            assert_eq!(pair[0].role, Role::User);
            assert_eq!(pair[0].content, input);
            assert_eq!(pair[1].role, Role::Model);
            assert_eq!(pair[1].content, input.to_uppercase());
        }
    }

    #[tokio::test]
    async fn test_only_the_new_prompt_is_sent() {
        let generator = ShoutingGenerator::new();
        let mut conversation = Conversation::new();

        submit(&mut conversation, &generator, "one").await.unwrap();
        submit(&mut conversation, &generator, "two").await.unwrap();

        assert_eq!(*generator.calls.lock().unwrap(), vec!["one", "two"]);
    }

    #[tokio::test]
    async fn test_failure_keeps_user_turn_without_reply() {
        let mut conversation = Conversation::new();

        let result = submit(&mut conversation, &FailingGenerator, "hello").await;

        assert!(matches!(result, Err(ChatError::Api(_))));
        assert_eq!(conversation.len(), 1);
        assert_eq!(conversation.turns()[0].role, Role::User);
        assert_eq!(conversation.turns()[0].content, "hello");
    }

    #[tokio::test]
    async fn test_steps_compose_like_submit() {
        let generator = ShoutingGenerator::new();
        let mut conversation = Conversation::new();

        let pending = begin_turn(&mut conversation, "step");
        assert_eq!(pending.prompt(), "step");
        assert_eq!(conversation.len(), 1);

        let generation = pending.resolve(&generator).await.unwrap();
        complete_turn(&mut conversation, &generation);

        assert_eq!(conversation.len(), 2);
        assert_eq!(conversation.turns()[1].content, "STEP");
    }

    #[tokio::test]
    async fn test_works_through_trait_object() {
        let generator: Box<dyn Generator> = Box::new(ShoutingGenerator::new());
        let mut conversation = Conversation::new();

        submit(&mut conversation, generator.as_ref(), "dyn").await.unwrap();
        assert_eq!(conversation.turns()[1].content, "DYN");
    }
}
