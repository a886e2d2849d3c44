use std::io::{self, BufRead, Write};

use anyhow::Result;

use persona_runtime::{ChatEngine, ChatSession};

pub(crate) async fn run_terminal_chat(engine: &ChatEngine, opening: &str) -> Result<()> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    run_line_session(engine, opening, stdin.lock(), stdout.lock()).await
}

/// Line-oriented chat loop.  `/exit` or end of input ends the session,
/// `/reset` starts over from the greeting.  A failed turn is reported and
/// the session carries on.
pub(crate) async fn run_line_session<R, W>(
    engine: &ChatEngine,
    opening: &str,
    mut input: R,
    mut output: W,
) -> Result<()>
where
    R: BufRead,
    W: Write,
{
    let mut session = ChatSession::with_opening(opening);
    writeln!(output, "{opening}")?;
    writeln!(output, "(type /reset to start over, /exit to quit)")?;

    loop {
        write!(output, "> ")?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            writeln!(output)?;
            writeln!(output, "session closed")?;
            break;
        }
        let line = line.trim();

        match line {
            "" => continue,
            "/exit" | "/quit" => {
                writeln!(output, "session closed")?;
                break;
            }
            "/reset" => {
                session.reset();
                writeln!(output, "history cleared")?;
                writeln!(output, "{opening}")?;
            }
            message => match session.submit(engine, message).await {
                Ok(reply) => writeln!(output, "{reply}")?,
                Err(err) => writeln!(output, "error: {err}")?,
            },
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::io::Cursor;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;

    use persona_llm::{ChatMessage, ChatModel, ChatResponse, LlmError};
    use persona_notify::LogNotifier;
    use persona_profile::Profile;
    use persona_runtime::EngineConfig;
    use persona_tools::ToolRegistry;

    struct CannedModel {
        replies: Mutex<VecDeque<ChatResponse>>,
        histories: Mutex<Vec<usize>>,
    }

    #[async_trait]
    impl ChatModel for CannedModel {
        fn model_name(&self) -> &str {
            "canned"
        }

        async fn complete(
            &self,
            messages: &[ChatMessage],
            _tools: &serde_json::Value,
        ) -> Result<ChatResponse, LlmError> {
            self.histories.lock().unwrap().push(messages.len());
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .ok_or(LlmError::EmptyResponse)
        }
    }

    fn engine(replies: Vec<ChatResponse>) -> (ChatEngine, Arc<CannedModel>) {
        let model = Arc::new(CannedModel {
            replies: Mutex::new(replies.into()),
            histories: Mutex::new(Vec::new()),
        });
        let engine = ChatEngine::new(
            Arc::new(Profile::new("Ada", "summary", "resume")),
            model.clone(),
            Arc::new(ToolRegistry::with_builtins(Arc::new(LogNotifier))),
            EngineConfig::default(),
        );
        (engine, model)
    }

    async fn run(engine: &ChatEngine, script: &str) -> String {
        let mut out = Vec::new();
        run_line_session(engine, "Hello!", Cursor::new(script.to_string()), &mut out)
            .await
            .unwrap();
        String::from_utf8(out).unwrap()
    }

    #[tokio::test]
    async fn prints_greeting_and_replies() {
        let (engine, _) = engine(vec![ChatResponse::text("I build engines.")]);
        let out = run(&engine, "What do you do?\n/exit\n").await;
        assert!(out.starts_with("Hello!\n"));
        assert!(out.contains("I build engines."));
        assert!(out.ends_with("session closed\n"));
    }

    #[tokio::test]
    async fn errors_do_not_end_the_session() {
        let (engine, _) = engine(vec![]);
        let out = run(&engine, "first\nsecond\n").await;
        assert_eq!(out.matches("error:").count(), 2);
        assert!(out.ends_with("session closed\n"));
    }

    #[tokio::test]
    async fn reset_drops_earlier_turns() {
        let (engine, model) = engine(vec![
            ChatResponse::text("one"),
            ChatResponse::text("two"),
            ChatResponse::text("three"),
        ]);
        let out = run(&engine, "a\nb\n/reset\nc\n").await;
        assert!(out.contains("history cleared"));

        // system + greeting + user, then two more turns, then back to the start
        assert_eq!(*model.histories.lock().unwrap(), vec![3, 5, 3]);
    }
}
