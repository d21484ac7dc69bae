//! UCI line formatting and reply parsing

use super::error::{EngineError, EngineResult};

pub const IS_READY: &str = "isready";
pub const READY_OK: &str = "readyok";
pub const GO: &str = "go";
pub const QUIT: &str = "quit";
pub const BESTMOVE: &str = "bestmove";
pub const PONDER: &str = "ponder";

/// Highest value accepted by the `Skill Level` option
pub const MAX_SKILL_LEVEL: u8 = 20;

/// Engine answer to a `go` request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineReply {
    /// Move the engine plays, e.g. `e7e5`
    pub best_move: String,
    /// Reply the engine expects from us, if it offered one
    pub ponder: Option<String>,
}

pub fn skill_level_command(difficulty: u8) -> String {
    format!(
        "setoption name Skill Level value {}",
        difficulty.min(MAX_SKILL_LEVEL)
    )
}

/// `position startpos moves …` for the full game so far
pub fn position_command(history: &[String]) -> String {
    if history.is_empty() {
        "position startpos".to_string()
    } else {
        format!("position startpos moves {}", history.join(" "))
    }
}

pub fn is_bestmove_line(line: &str) -> bool {
    line.split_whitespace().next() == Some(BESTMOVE)
}

/// Parse a `bestmove <move> [ponder <move>] …` line
///
/// Tokens are matched by keyword rather than position so engines that append
/// extra fields still parse.
pub fn parse_bestmove(line: &str) -> EngineResult<EngineReply> {
    let mut tokens = line.split_whitespace();
    if tokens.next() != Some(BESTMOVE) {
        return Err(EngineError::protocol(format!(
            "expected '{BESTMOVE}' line, got '{line}'"
        )));
    }

    let best_move = match tokens.next() {
        Some("(none)") | Some("0000") => {
            return Err(EngineError::protocol("engine reported no legal move"));
        }
        Some(mv) => mv.to_string(),
        None => return Err(EngineError::protocol("bestmove line carries no move")),
    };

    let mut ponder = None;
    while let Some(token) = tokens.next() {
        if token == PONDER {
            ponder = tokens.next().map(str::to_string);
            break;
        }
    }

    Ok(EngineReply { best_move, ponder })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_command_formats_history() {
        assert_eq!(position_command(&[]), "position startpos");
        let history = vec!["e2e4".to_string(), "e7e5".to_string()];
        assert_eq!(
            position_command(&history),
            "position startpos moves e2e4 e7e5"
        );
    }

    #[test]
    fn test_skill_level_is_clamped() {
        assert_eq!(
            skill_level_command(5),
            "setoption name Skill Level value 5"
        );
        assert_eq!(
            skill_level_command(99),
            "setoption name Skill Level value 20"
        );
    }

    #[test]
    fn test_parse_bestmove_plain() {
        let reply = parse_bestmove("bestmove e7e5").unwrap();
        assert_eq!(reply.best_move, "e7e5");
        assert_eq!(reply.ponder, None);
    }

    #[test]
    fn test_parse_bestmove_with_ponder() {
        let reply = parse_bestmove("bestmove g8f6 ponder b1c3").unwrap();
        assert_eq!(reply.best_move, "g8f6");
        assert_eq!(reply.ponder.as_deref(), Some("b1c3"));
    }

    #[test]
    fn test_parse_bestmove_tolerates_extra_tokens() {
        let reply = parse_bestmove("bestmove d7d5 extra stuff ponder c2c4 trailing").unwrap();
        assert_eq!(reply.best_move, "d7d5");
        assert_eq!(reply.ponder.as_deref(), Some("c2c4"));
    }

    #[test]
    fn test_parse_bestmove_rejects_missing_move() {
        assert!(matches!(
            parse_bestmove("bestmove"),
            Err(EngineError::Protocol { .. })
        ));
        assert!(matches!(
            parse_bestmove("bestmove (none)"),
            Err(EngineError::Protocol { .. })
        ));
    }

    #[test]
    fn test_is_bestmove_line() {
        assert!(is_bestmove_line("bestmove e2e4"));
        assert!(!is_bestmove_line("info depth 12 score cp 30"));
        assert!(!is_bestmove_line("bestmoves"));
    }
}
