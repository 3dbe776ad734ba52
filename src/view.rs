use std::io::{self, BufRead, Write};
use std::thread;

use anyhow::{Context, Result};
use crossbeam::channel::bounded;
use tracing::{debug, error, info};

use crate::catalog::filter::PackSelector;
use crate::catalog::locator::display_path;
use crate::catalog::model::{EmoticonRecord, Pack};
use crate::pipeline::Catalog;

/// A user change to the view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    SelectPack(PackSelector),
    Query(String),
    Quit,
}

/// `:pack <id|all>`, `:quit`, or any other text as the new query.
pub fn parse_intent(line: &str) -> Intent {
    let trimmed = line.trim();
    if trimmed == ":quit" || trimmed == ":q" {
        return Intent::Quit;
    }
    if let Some(rest) = trimmed.strip_prefix(":pack") {
        if rest.is_empty() || rest.starts_with(char::is_whitespace) {
            return Intent::SelectPack(PackSelector::parse(rest));
        }
    }
    Intent::Query(trimmed.to_string())
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewState {
    pub selector: PackSelector,
    pub query: String,
}

impl ViewState {
    /// Next state for an intent, or `None` when the session should end.
    pub fn apply(self, intent: Intent) -> Option<ViewState> {
        match intent {
            Intent::SelectPack(selector) => Some(ViewState { selector, ..self }),
            Intent::Query(query) => Some(ViewState { query, ..self }),
            Intent::Quit => None,
        }
    }

    pub fn visible<'c>(&self, catalog: &'c Catalog) -> Vec<&'c EmoticonRecord> {
        catalog.filter(&self.selector, &self.query)
    }
}

pub fn render_pack_options(packs: &[Pack], out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "{}\tAll packs", PackSelector::ALL)?;
    for pack in packs {
        writeln!(out, "{}\t{}", pack.id, pack.title)?;
    }
    Ok(())
}

pub fn render_text(records: &[&EmoticonRecord], out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "{} emoticons", records.len())?;
    for record in records {
        let tags: Vec<String> = record.keywords.iter().map(|k| format!("#{}", k)).collect();
        let marker = if record.img_verified { "" } else { " (unverified)" };
        writeln!(out, "{} [{}]", record.title, record.pack_title)?;
        if !record.description.is_empty() {
            writeln!(out, "    {}", record.description)?;
        }
        if !tags.is_empty() {
            writeln!(out, "    {}", tags.join(" "))?;
        }
        writeln!(out, "    {}{}", display_path(&record.img_src), marker)?;
    }
    Ok(())
}

pub fn render_json(records: &[&EmoticonRecord], out: &mut impl Write) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, records).context("Failed to write JSON")?;
    writeln!(out)?;
    Ok(())
}

/// Reads intents from stdin on a separate thread and re-renders the whole
/// view from the catalog after every change.
pub fn run_interactive(catalog: &Catalog, initial: ViewState) -> Result<()> {
    let (tx, rx) = bounded::<Intent>(64);

    let input = thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            let intent = parse_intent(&line);
            let quit = intent == Intent::Quit;
            if tx.send(intent).is_err() || quit {
                break;
            }
        }
    });

    let stdout = io::stdout();
    let mut state = initial;
    render_text(&state.visible(catalog), &mut stdout.lock())?;
    prompt(&state)?;

    for intent in rx {
        debug!("Intent: {:?}", intent);
        state = match state.apply(intent) {
            Some(next) => next,
            None => break,
        };
        render_text(&state.visible(catalog), &mut stdout.lock())?;
        prompt(&state)?;
    }

    // The input thread ends on quit or EOF; a stuck read is left to process exit.
    if input.is_finished() {
        join_input(input);
    }
    info!("Interactive session ended");
    Ok(())
}

/// Joins the stdin reader, logging a panic instead of dropping it.
fn join_input(input: thread::JoinHandle<()>) -> bool {
    match input.join() {
        Ok(()) => true,
        Err(_) => {
            error!("Input thread panicked");
            false
        }
    }
}

fn prompt(state: &ViewState) -> io::Result<()> {
    let mut stderr = io::stderr();
    write!(stderr, "[pack: {}] search> ", state.selector)?;
    stderr.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::model::PackId;

    fn catalog() -> Catalog {
        let record = |id: i64, pack: &str, title: &str, verified: bool| EmoticonRecord {
            pack_id: PackId::Id(id),
            pack_title: pack.to_string(),
            title: title.to_string(),
            description: String::new(),
            keywords: vec!["tag".to_string()],
            img_src: format!(
                "https://example.com/images/{}/{}",
                pack,
                title.replace(' ', "%20")
            ),
            img_verified: verified,
        };
        Catalog {
            packs: vec![
                Pack {
                    id: PackId::Id(1),
                    title: "Cats".into(),
                },
                Pack {
                    id: PackId::Id(2),
                    title: "Dogs".into(),
                },
            ],
            emoticons: vec![
                record(1, "Cats", "big smile.png", true),
                record(2, "Dogs", "woof.png", false),
            ],
        }
    }

    #[test]
    fn test_parse_intent() {
        assert_eq!(parse_intent(":pack 2"), Intent::SelectPack(PackSelector::Id("2".into())));
        assert_eq!(parse_intent(":pack all"), Intent::SelectPack(PackSelector::All));
        assert_eq!(parse_intent(":pack"), Intent::SelectPack(PackSelector::All));
        assert_eq!(parse_intent(":quit"), Intent::Quit);
        assert_eq!(parse_intent("  smile "), Intent::Query("smile".into()));
        assert_eq!(parse_intent(""), Intent::Query(String::new()));
        assert_eq!(parse_intent(":packs"), Intent::Query(":packs".into()));
    }

    #[test]
    fn test_state_recomputes_on_every_change() {
        let catalog = catalog();
        let state = ViewState::default();
        assert_eq!(state.visible(&catalog).len(), 2);

        let state = state.apply(parse_intent(":pack 2")).unwrap();
        assert_eq!(state.visible(&catalog).len(), 1);

        let state = state.apply(parse_intent("smile")).unwrap();
        assert!(state.visible(&catalog).is_empty());

        let state = state.apply(parse_intent(":pack all")).unwrap();
        let visible = state.visible(&catalog);
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].title, "big smile.png");

        assert!(state.apply(Intent::Quit).is_none());
    }

    #[test]
    fn test_render_text_shows_count_and_decoded_path() -> Result<()> {
        let catalog = catalog();
        let mut out = Vec::new();
        render_text(&ViewState::default().visible(&catalog), &mut out)?;
        let text = String::from_utf8(out)?;
        assert!(text.starts_with("2 emoticons\n"));
        assert!(text.contains("https://example.com/images/Cats/big smile.png\n"));
        assert!(text.contains("woof.png (unverified)"));
        assert!(text.contains("#tag"));
        Ok(())
    }

    #[test]
    fn test_input_thread_panic_is_reported() {
        let input = thread::spawn(|| panic!("stdin closed badly"));
        assert!(!join_input(input));
        assert!(join_input(thread::spawn(|| {})));
    }

    #[test]
    fn test_render_pack_options() -> Result<()> {
        let mut out = Vec::new();
        render_pack_options(&catalog().packs, &mut out)?;
        assert_eq!(String::from_utf8(out)?, "all\tAll packs\n1\tCats\n2\tDogs\n");
        Ok(())
    }

    #[test]
    fn test_render_json() -> Result<()> {
        let catalog = catalog();
        let mut out = Vec::new();
        render_json(&catalog.filter(&PackSelector::parse("1"), ""), &mut out)?;
        let value: serde_json::Value = serde_json::from_slice(&out)?;
        assert_eq!(value[0]["packTitle"], "Cats");
        assert_eq!(value.as_array().map(Vec::len), Some(1));
        Ok(())
    }
}
