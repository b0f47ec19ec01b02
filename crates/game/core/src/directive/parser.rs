//! Token scanner for `@@TAG(k=v, …)` directives.
//!
//! Tokens may appear anywhere in a line and may be wrapped in a pair of
//! parentheses: `(@@COMBAT_START(cause=admin))`. Values may be double-quoted;
//! commas inside quotes do not split arguments. An empty value or `none`
//! counts as absent.

use std::collections::BTreeMap;

use super::{Directive, DirectiveError, DirectiveTag, EnemyDescriptor, StartCause};
use crate::config::CombatConfig;

const MARKER: &str = "@@";

/// Directives lifted out of a text, plus what remains visible.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ParsedText {
    /// Well-formed directives in text order.
    pub directives: Vec<Directive>,
    pub malformed: Vec<DirectiveError>,
    /// Input with recognized tokens removed, emptied lines dropped, trimmed.
    pub visible_text: String,
}

impl ParsedText {
    /// True when at least one recognized token was found, well-formed or not.
    pub fn had_tokens(&self) -> bool {
        !self.directives.is_empty() || !self.malformed.is_empty()
    }
}

/// Extracts every recognized directive from `text`.
///
/// Unrecognized `@@` tokens stay in the visible text.
pub fn parse(text: &str) -> ParsedText {
    let mut parsed = ParsedText::default();
    let mut visible: Vec<String> = Vec::new();

    for line in text.lines() {
        match scan_line(line, &mut parsed) {
            None => visible.push(line.to_owned()),
            Some(rest) if !rest.trim().is_empty() => visible.push(rest.trim_end().to_owned()),
            Some(_) => {}
        }
    }

    parsed.visible_text = visible.join("\n").trim().to_owned();
    parsed
}

/// Removes the tokens of one line. Returns `None` when the line had none.
fn scan_line(line: &str, parsed: &mut ParsedText) -> Option<String> {
    let mut out = String::new();
    let mut cursor = 0;
    let mut touched = false;

    while let Some(offset) = line[cursor..].find(MARKER) {
        let at = cursor + offset;
        let after = at + MARKER.len();
        let Some(tag) = DirectiveTag::match_at(&line[after..]) else {
            out.push_str(&line[cursor..after]);
            cursor = after;
            continue;
        };

        touched = true;
        out.push_str(&line[cursor..at]);
        let args_start = after + tag.as_ref().len() + 1;

        let Some(close) = find_close(&line[args_start..]) else {
            drop_wrapping_paren(&mut out);
            parsed.malformed.push(DirectiveError::Unterminated { tag });
            cursor = line.len();
            break;
        };

        let raw_args = &line[args_start..args_start + close];
        let mut end = args_start + close + 1;
        let trailing = line[end..].trim_start();
        if trailing.starts_with(')') && drop_wrapping_paren(&mut out) {
            end = line.len() - trailing.len() + 1;
        }

        match build(tag, &Args::parse(tag, raw_args)) {
            Ok(directive) => parsed.directives.push(directive),
            Err(error) => parsed.malformed.push(error),
        }
        cursor = end;
    }

    if !touched {
        return None;
    }
    out.push_str(&line[cursor..]);
    Some(out)
}

/// Offset of the first `)` outside double quotes.
fn find_close(raw: &str) -> Option<usize> {
    let mut in_quotes = false;
    for (index, byte) in raw.bytes().enumerate() {
        match byte {
            b'"' => in_quotes = !in_quotes,
            b')' if !in_quotes => return Some(index),
            _ => {}
        }
    }
    None
}

/// Strips a trailing `(` (and the whitespace after it) from `out`.
fn drop_wrapping_paren(out: &mut String) -> bool {
    let trimmed = out.trim_end().len();
    if out[..trimmed].ends_with('(') {
        out.truncate(trimmed - 1);
        true
    } else {
        false
    }
}

/// Argument list of one token, keyed by lowercase name.
struct Args {
    tag: DirectiveTag,
    values: BTreeMap<String, String>,
}

impl Args {
    fn parse(tag: DirectiveTag, raw: &str) -> Self {
        let mut values = BTreeMap::new();
        for part in split_outside_quotes(raw) {
            let Some((key, value)) = part.split_once('=') else {
                continue;
            };
            let key = key.trim();
            if key.is_empty() {
                continue;
            }
            values.insert(key.to_ascii_lowercase(), value.trim().to_owned());
        }
        Self { tag, values }
    }

    fn text(&self, key: &str) -> Option<String> {
        self.values.get(key).and_then(|value| clean(value)).map(str::to_owned)
    }

    fn required(&self, key: &'static str) -> Result<String, DirectiveError> {
        self.text(key).ok_or(DirectiveError::MissingArgument { tag: self.tag, key })
    }

    fn int(&self, key: &str) -> Result<Option<i32>, DirectiveError> {
        let Some(value) = self.text(key) else {
            return Ok(None);
        };
        value
            .parse::<i32>()
            .map(Some)
            .map_err(|_| DirectiveError::InvalidInteger {
                tag: self.tag,
                key: key.to_owned(),
                value,
            })
    }
}

fn split_outside_quotes(raw: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut in_quotes = false;
    let mut start = 0;
    for (index, byte) in raw.bytes().enumerate() {
        match byte {
            b'"' => in_quotes = !in_quotes,
            b',' if !in_quotes => {
                parts.push(&raw[start..index]);
                start = index + 1;
            }
            _ => {}
        }
    }
    parts.push(&raw[start..]);
    parts.into_iter().map(str::trim).filter(|part| !part.is_empty()).collect()
}

/// Strips surrounding quotes; empty and `none` values are absent.
fn clean(value: &str) -> Option<&str> {
    let mut cleaned = value.trim();
    if cleaned.len() >= 2 && cleaned.starts_with('"') && cleaned.ends_with('"') {
        cleaned = cleaned[1..cleaned.len() - 1].trim();
    }
    if cleaned.is_empty() || cleaned.eq_ignore_ascii_case("none") {
        None
    } else {
        Some(cleaned)
    }
}

fn build(tag: DirectiveTag, args: &Args) -> Result<Directive, DirectiveError> {
    match tag {
        DirectiveTag::Start => {
            let cause = match args.text("cause") {
                None => StartCause::Narrative,
                Some(value) => value
                    .parse()
                    .map_err(|_| DirectiveError::UnknownCause { value })?,
            };
            Ok(Directive::Start {
                cause,
                zone: args.text("zone"),
                surprise: args.text("surprise"),
            })
        }
        DirectiveTag::EnemyAdd => {
            let descriptor = EnemyDescriptor {
                id: args.text("enemy_id").or_else(|| args.text("id")),
                name: args.required("name")?,
                hp: args.int("hp")?,
                ac: args.int("ac")?,
                init_mod: args.int("init_mod")?,
                threat: args.int("threat")?,
                profile: args.text("profile"),
            };
            let count = match args.int("count")? {
                None => 1,
                Some(value) => u32::try_from(value)
                    .ok()
                    .filter(|count| (1..=CombatConfig::MAX_ENEMY_COUNT).contains(count))
                    .ok_or(DirectiveError::CountOutOfRange { value })?,
            };
            Ok(Directive::EnemyAdd {
                enemies: descriptor.expand(count),
            })
        }
        DirectiveTag::End => Ok(Directive::End {
            result: args.text("result").and_then(|value| value.parse().ok()),
        }),
        DirectiveTag::RandomEvent => Ok(Directive::RandomEvent {
            key: args.required("key")?,
            category: args.text("category"),
            severity: args.int("severity")?,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::EncounterOutcome;

    #[test]
    fn wrapped_start_is_removed_from_visible_text() {
        let parsed = parse("Fog rolls in\n(@@COMBAT_START(zone=\"bridge\", cause=ambush))\nSteel rings out");
        assert_eq!(parsed.visible_text, "Fog rolls in\nSteel rings out");
        assert_eq!(
            parsed.directives,
            vec![Directive::Start {
                cause: StartCause::Ambush,
                zone: Some("bridge".into()),
                surprise: None,
            }]
        );
    }

    #[test]
    fn enemy_add_reads_every_field() {
        let parsed = parse(
            "@@COMBAT_ENEMY_ADD(enemy_id=gob1, name=\"Goblin Raider\", hp=12, ac=13, init_mod=2, threat=1)",
        );
        assert_eq!(parsed.visible_text, "");
        let Directive::EnemyAdd { enemies } = &parsed.directives[0] else {
            panic!("expected enemy add, got {:?}", parsed.directives);
        };
        assert_eq!(
            enemies[0],
            EnemyDescriptor {
                id: Some("gob1".into()),
                name: "Goblin Raider".into(),
                hp: Some(12),
                ac: Some(13),
                init_mod: Some(2),
                threat: Some(1),
                profile: None,
            }
        );
    }

    #[test]
    fn tokens_inside_a_sentence_are_lifted_out() {
        let parsed = parse("The storm breaks @@RANDOM_EVENT(key=storm, category=weather, severity=2) over the hills.");
        assert_eq!(parsed.visible_text, "The storm breaks  over the hills.");
        assert_eq!(
            parsed.directives,
            vec![Directive::RandomEvent {
                key: "storm".into(),
                category: Some("weather".into()),
                severity: Some(2),
            }]
        );
    }

    #[test]
    fn quoted_commas_do_not_split() {
        let parsed = parse("@@COMBAT_ENEMY_ADD(name=\"Grim, the Tall\", hp=none)");
        let Directive::EnemyAdd { enemies } = &parsed.directives[0] else {
            panic!("expected enemy add");
        };
        assert_eq!(enemies[0].name, "Grim, the Tall");
        assert_eq!(enemies[0].hp, None);
        assert_eq!(enemies[0].id, None);
    }

    #[test]
    fn malformed_tokens_are_isolated() {
        let text = "@@COMBAT_ENEMY_ADD(name=Orc, hp=lots)\n@@COMBAT_ENEMY_ADD(hp=3)\n@@COMBAT_END(result=victory)\n@@COMBAT_START(cause=admin";
        let parsed = parse(text);
        assert_eq!(
            parsed.directives,
            vec![Directive::End {
                result: Some(EncounterOutcome::Victory)
            }]
        );
        assert_eq!(
            parsed.malformed,
            vec![
                DirectiveError::InvalidInteger {
                    tag: DirectiveTag::EnemyAdd,
                    key: "hp".into(),
                    value: "lots".into(),
                },
                DirectiveError::MissingArgument {
                    tag: DirectiveTag::EnemyAdd,
                    key: "name",
                },
                DirectiveError::Unterminated {
                    tag: DirectiveTag::Start
                },
            ]
        );
        assert_eq!(parsed.visible_text, "");
    }

    #[test]
    fn unknown_cause_is_malformed_and_missing_cause_is_narrative() {
        let parsed = parse("@@COMBAT_START(cause=rumour)\n@@COMBAT_START()");
        assert_eq!(
            parsed.malformed,
            vec![DirectiveError::UnknownCause {
                value: "rumour".into()
            }]
        );
        assert!(matches!(
            parsed.directives[0],
            Directive::Start {
                cause: StartCause::Narrative,
                ..
            }
        ));
    }

    #[test]
    fn unrecognized_tokens_stay_visible() {
        let parsed = parse("Mail me at @@home or @@COMBAT_PAUSE(x=1)");
        assert!(!parsed.had_tokens());
        assert_eq!(parsed.visible_text, "Mail me at @@home or @@COMBAT_PAUSE(x=1)");
    }

    #[test]
    fn count_expands_and_is_bounded() {
        let parsed = parse("@@COMBAT_ENEMY_ADD(name=Rat, count=3)\n@@COMBAT_ENEMY_ADD(name=Rat, count=40)");
        let Directive::EnemyAdd { enemies } = &parsed.directives[0] else {
            panic!("expected enemy add");
        };
        assert_eq!(enemies.len(), 3);
        assert_eq!(enemies[2].name, "Rat 3");
        assert_eq!(parsed.malformed, vec![DirectiveError::CountOutOfRange { value: 40 }]);
    }
}
