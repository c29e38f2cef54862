//! Line-oriented terminal front end
//!
//! Turns typed lines into session events and prints the UI events the
//! controller broadcasts.

use ferry_chat::runtime::{SessionHandle, UiEvent};
use ferry_chat::state_machine::{Event, PendingEdit, PoolKind, Role, SessionState, Turn};
use ferry_chat::suggestions::SuggestionPool;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast;

const HELP: &str = "\
Commands:
  <text>               send a message
  /edit N [text]       edit user turn N (resends when text is given)
  /cancel              abandon the current edit
  /pick s|d N          move suggestion N into the input field
  /send                send the input field
  /reset               clear the message history
  /quit                exit";

/// One parsed line of terminal input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Send(String),
    Edit { index: usize, text: Option<String> },
    Cancel,
    Pick { pool: PoolKind, position: usize },
    SendInput,
    Reset,
    Help,
    Quit,
}

pub fn parse_command(line: &str) -> Result<Command, String> {
    let line = line.trim();
    let Some(rest) = line.strip_prefix('/') else {
        return Ok(Command::Send(line.to_string()));
    };

    let (name, args) = rest.split_once(' ').unwrap_or((rest, ""));
    let args = args.trim();
    match name {
        "edit" => {
            let (index, text) = args.split_once(' ').unwrap_or((args, ""));
            let index = index
                .parse()
                .map_err(|_| format!("Not a turn number: {index:?}"))?;
            let text = Some(text.trim().to_string()).filter(|t| !t.is_empty());
            Ok(Command::Edit { index, text })
        }
        "pick" => {
            let (pool, position) = args.split_once(' ').unwrap_or((args, ""));
            let pool = match pool {
                "s" | "static" => PoolKind::Static,
                "d" | "dynamic" => PoolKind::Dynamic,
                other => return Err(format!("Unknown pool {other:?}, use s or d")),
            };
            let position = position
                .trim()
                .parse()
                .ok()
                .filter(|p| *p > 0)
                .ok_or_else(|| format!("Not a suggestion number: {position:?}"))?;
            Ok(Command::Pick { pool, position })
        }
        "cancel" => Ok(Command::Cancel),
        "send" => Ok(Command::SendInput),
        "reset" => Ok(Command::Reset),
        "help" => Ok(Command::Help),
        "quit" | "exit" => Ok(Command::Quit),
        other => Err(format!("Unknown command /{other}")),
    }
}

/// What the terminal currently shows
#[derive(Debug, Default)]
pub struct TerminalView {
    turns: Vec<Turn>,
    static_pool: SuggestionPool,
    dynamic_pool: SuggestionPool,
    input: String,
    edit: Option<PendingEdit>,
    typing: bool,
    highlight: Option<(usize, Instant)>,
}

pub type SharedView = Arc<Mutex<TerminalView>>;

impl TerminalView {
    pub fn from_state(state: &SessionState) -> Self {
        Self {
            turns: state.transcript.clone(),
            static_pool: state.static_pool.clone(),
            dynamic_pool: state.dynamic_pool.clone(),
            input: state.input.clone(),
            ..Self::default()
        }
    }

    pub fn shared(self) -> SharedView {
        Arc::new(Mutex::new(self))
    }

    /// Events a command stands for, given what is on screen
    pub fn events_for(&self, command: Command) -> Result<Vec<Event>, String> {
        let events = match command {
            Command::Send(text) => vec![Event::UserSend { text }],
            // A rejected BeginEdit would leave CommitEdit to land on an older edit
            Command::Edit { index, .. } if !self.turns.get(index).is_some_and(Turn::is_user) => {
                return Err(format!("#{index} is not one of your messages"))
            }
            Command::Edit { index, text: None } => vec![Event::BeginEdit { index }],
            Command::Edit {
                index,
                text: Some(text),
            } => vec![Event::BeginEdit { index }, Event::CommitEdit { text }],
            Command::Cancel if self.edit.is_none() => return Err("No edit in progress".to_string()),
            Command::Cancel => vec![Event::CancelEdit],
            Command::Pick { pool, position } => {
                let pool_view = match pool {
                    PoolKind::Static => &self.static_pool,
                    PoolKind::Dynamic => &self.dynamic_pool,
                };
                let question = pool_view
                    .questions()
                    .get(position.wrapping_sub(1))
                    .ok_or_else(|| format!("No suggestion {position}"))?;
                vec![Event::SuggestionSelected {
                    pool,
                    question: question.clone(),
                }]
            }
            Command::SendInput if self.input.trim().is_empty() => {
                return Err("Input field is empty, /pick a suggestion first".to_string())
            }
            Command::SendInput => vec![Event::SubmitInput],
            Command::Reset => vec![Event::ResetSession],
            Command::Help | Command::Quit => vec![],
        };
        Ok(events)
    }

    /// Fold a UI event into the view, returning the lines to print
    pub fn apply(&mut self, event: UiEvent) -> Vec<String> {
        let mut lines = Vec::new();
        match event {
            UiEvent::TranscriptChanged { turns } => {
                if turns.len() < self.turns.len() {
                    lines.push("-- history cleared --".to_string());
                    lines.extend(turns.iter().enumerate().map(|(i, t)| format_turn(i, t, false)));
                } else {
                    for (i, turn) in turns.iter().enumerate() {
                        if self.turns.get(i) != Some(turn) {
                            lines.push(format_turn(i, turn, self.is_highlighted(i)));
                        }
                    }
                }
                self.turns = turns;
            }
            UiEvent::TypingChanged { typing } => {
                if typing && !self.typing {
                    lines.push("   ...".to_string());
                }
                self.typing = typing;
            }
            UiEvent::Highlight { index, duration } => {
                self.highlight = Some((index, Instant::now() + duration));
                if let Some(turn) = self.turns.get(index) {
                    lines.push(format_turn(index, turn, true));
                }
            }
            UiEvent::SuggestionsChanged {
                static_pool,
                dynamic_pool,
            } => {
                self.static_pool = static_pool;
                self.dynamic_pool = dynamic_pool;
                lines.extend(self.suggestion_lines());
            }
            UiEvent::InputChanged { text } => {
                if !text.is_empty() {
                    lines.push(format!("input: {text}  (/send to send)"));
                }
                self.input = text;
            }
            UiEvent::EditChanged { edit } => {
                if let Some(edit) = &edit {
                    lines.push(format!("editing #{}: {}", edit.index, edit.draft));
                }
                self.edit = edit;
            }
            // A terminal always follows the latest output
            UiEvent::ScrollToBottom | UiEvent::ScrollIndicatorChanged { .. } => {}
        }
        lines
    }

    pub fn suggestion_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        for (label, pool) in [("s", &self.static_pool), ("d", &self.dynamic_pool)] {
            for (i, question) in pool.questions().iter().enumerate() {
                lines.push(format!("  [{label} {}] {question}", i + 1));
            }
        }
        lines
    }

    pub fn transcript_lines(&self) -> Vec<String> {
        self.turns
            .iter()
            .enumerate()
            .map(|(i, t)| format_turn(i, t, false))
            .collect()
    }

    fn is_highlighted(&self, index: usize) -> bool {
        self.highlight
            .is_some_and(|(i, until)| i == index && Instant::now() < until)
    }
}

fn format_turn(index: usize, turn: &Turn, highlighted: bool) -> String {
    let who = match turn.role {
        Role::User => "you",
        Role::Assistant => "bot",
    };
    let mark = if highlighted { "*" } else { " " };
    format!("{mark}#{index} {who}: {}", turn.content)
}

fn lock(view: &SharedView) -> MutexGuard<'_, TerminalView> {
    view.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Print UI events until the controller goes away
pub async fn render(mut rx: broadcast::Receiver<UiEvent>, view: SharedView) {
    loop {
        match rx.recv().await {
            Ok(event) => {
                for line in lock(&view).apply(event) {
                    println!("{line}");
                }
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "Renderer fell behind");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

/// Read commands from stdin until `/quit` or end of input
pub async fn repl(handle: SessionHandle, view: SharedView) -> std::io::Result<()> {
    {
        let view = lock(&view);
        for line in view.transcript_lines() {
            println!("{line}");
        }
        for line in view.suggestion_lines() {
            println!("{line}");
        }
    }
    println!("Type /help for commands.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let command = match parse_command(&line) {
            Ok(command) => command,
            Err(e) => {
                println!("{e}");
                continue;
            }
        };
        match command {
            Command::Quit => break,
            Command::Help => println!("{HELP}"),
            command => {
                let events = lock(&view).events_for(command);
                match events {
                    Ok(events) => {
                        for event in events {
                            if !handle.send(event).await {
                                return Ok(());
                            }
                        }
                    }
                    Err(e) => println!("{e}"),
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_parse_plain_text_is_a_send() {
        assert_eq!(
            parse_command("  Ferries to Paros?  ").unwrap(),
            Command::Send("Ferries to Paros?".to_string())
        );
    }

    #[test]
    fn test_parse_edit() {
        assert_eq!(
            parse_command("/edit 2").unwrap(),
            Command::Edit { index: 2, text: None }
        );
        assert_eq!(
            parse_command("/edit 0 Ferries to Milos?").unwrap(),
            Command::Edit {
                index: 0,
                text: Some("Ferries to Milos?".to_string())
            }
        );
        assert!(parse_command("/edit two").is_err());
    }

    #[test]
    fn test_parse_pick() {
        assert_eq!(
            parse_command("/pick d 1").unwrap(),
            Command::Pick {
                pool: PoolKind::Dynamic,
                position: 1
            }
        );
        assert!(parse_command("/pick x 1").is_err());
        assert!(parse_command("/pick s 0").is_err());
    }

    #[test]
    fn test_parse_simple_commands() {
        assert_eq!(parse_command("/reset").unwrap(), Command::Reset);
        assert_eq!(parse_command("/quit").unwrap(), Command::Quit);
        assert_eq!(parse_command("/send").unwrap(), Command::SendInput);
        assert!(parse_command("/dance").is_err());
    }

    #[test]
    fn test_pick_resolves_question_from_view() {
        let view = TerminalView {
            static_pool: SuggestionPool::from_questions(["a", "b"]),
            ..TerminalView::default()
        };
        let events = view
            .events_for(Command::Pick {
                pool: PoolKind::Static,
                position: 2,
            })
            .unwrap();
        assert!(matches!(
            events.as_slice(),
            [Event::SuggestionSelected { pool: PoolKind::Static, question }] if question == "b"
        ));
        assert!(view
            .events_for(Command::Pick {
                pool: PoolKind::Dynamic,
                position: 1
            })
            .is_err());
    }

    #[test]
    fn test_edit_requires_user_turn_on_screen() {
        let mut view = TerminalView::default();
        view.apply(UiEvent::TranscriptChanged {
            turns: vec![
                Turn::user("a"),
                Turn::assistant("b"),
                Turn::user("c"),
                Turn::assistant("d"),
            ],
        });

        for index in [3, 4] {
            assert!(view
                .events_for(Command::Edit {
                    index,
                    text: Some("new text".to_string()),
                })
                .is_err());
        }
        assert!(view
            .events_for(Command::Edit {
                index: 1,
                text: None
            })
            .is_err());

        let events = view
            .events_for(Command::Edit {
                index: 2,
                text: Some("new text".to_string()),
            })
            .unwrap();
        assert!(matches!(
            events.as_slice(),
            [Event::BeginEdit { index: 2 }, Event::CommitEdit { text }] if text == "new text"
        ));
    }

    #[test]
    fn test_send_input_and_cancel_need_something_on_screen() {
        let mut view = TerminalView::default();
        assert!(view.events_for(Command::SendInput).is_err());
        assert!(view.events_for(Command::Cancel).is_err());

        view.apply(UiEvent::InputChanged {
            text: "Ferries to Milos?".to_string(),
        });
        view.apply(UiEvent::EditChanged {
            edit: Some(PendingEdit {
                index: 1,
                draft: "Hi".to_string(),
            }),
        });
        assert!(matches!(
            view.events_for(Command::SendInput).unwrap().as_slice(),
            [Event::SubmitInput]
        ));
        assert!(matches!(
            view.events_for(Command::Cancel).unwrap().as_slice(),
            [Event::CancelEdit]
        ));
    }

    #[test]
    fn test_view_prints_only_changed_turns() {
        let mut view = TerminalView::default();
        view.apply(UiEvent::TranscriptChanged {
            turns: vec![Turn::assistant("Hello!")],
        });
        let lines = view.apply(UiEvent::TranscriptChanged {
            turns: vec![Turn::assistant("Hello!"), Turn::user("Hi")],
        });
        assert_eq!(lines, vec![" #1 you: Hi".to_string()]);

        let lines = view.apply(UiEvent::Highlight {
            index: 1,
            duration: Duration::from_secs(2),
        });
        assert_eq!(lines, vec!["*#1 you: Hi".to_string()]);
    }
}
