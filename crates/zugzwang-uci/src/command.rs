//! UCI command parsing.

use std::time::Duration;

use zugzwang_core::{Board, Move};

use crate::error::UciError;

/// Parameters accepted by the `go` command.
///
/// Pondering is not supported — the `ponder` token, if present, is accepted
/// and ignored rather than rejected, so GUIs that always send it don't break.
#[derive(Debug, Clone, Default)]
pub struct GoParams {
    /// Fixed search depth in plies (`go depth N`).
    pub depth: Option<u8>,
    /// White's remaining clock time.
    pub wtime: Option<Duration>,
    /// Black's remaining clock time.
    pub btime: Option<Duration>,
    /// White's increment per move.
    pub winc: Option<Duration>,
    /// Black's increment per move.
    pub binc: Option<Duration>,
    /// Moves remaining until the next time control.
    pub movestogo: Option<u32>,
    /// Fixed time to search (`go movetime N`).
    pub movetime: Option<Duration>,
    /// Node budget (`go nodes N`).
    pub nodes: Option<u64>,
    /// `go infinite` — search until `stop`, ignoring all other limits.
    pub infinite: bool,
}

/// A parsed UCI command.
#[derive(Debug)]
pub enum Command {
    /// `uci` -- identify the engine.
    Uci,
    /// `isready` -- synchronization ping.
    IsReady,
    /// `ucinewgame` -- reset engine state.
    UciNewGame,
    /// `position` -- set up a board position with optional moves applied.
    Position(Board),
    /// `go [...]` -- start a search with the given limits.
    Go(GoParams),
    /// `stop` -- halt the current search.
    Stop,
    /// `quit` -- exit the engine.
    Quit,
    /// Unrecognized command (silently ignored per UCI spec).
    Unknown(String),
}

/// Parse a single line of UCI input into a [`Command`].
pub fn parse_command(line: &str) -> Result<Command, UciError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.is_empty() {
        return Ok(Command::Unknown(String::new()));
    }

    match tokens[0] {
        "uci" => Ok(Command::Uci),
        "isready" => Ok(Command::IsReady),
        "ucinewgame" => Ok(Command::UciNewGame),
        "stop" => Ok(Command::Stop),
        "quit" => Ok(Command::Quit),
        "position" => parse_position(&tokens[1..]),
        "go" => parse_go(&tokens[1..]),
        _ => Ok(Command::Unknown(tokens[0].to_string())),
    }
}

/// Parse the `position` command arguments.
///
/// Supports:
/// - `position startpos [moves e2e4 d7d5 ...]`
/// - `position fen <fen-string> [moves e2e4 d7d5 ...]`
fn parse_position(tokens: &[&str]) -> Result<Command, UciError> {
    if tokens.is_empty() {
        return Err(UciError::MalformedPosition);
    }

    let (mut board, rest) = if tokens[0] == "startpos" {
        let rest = &tokens[1..];
        (Board::starting_position(), rest)
    } else if tokens[0] == "fen" {
        // FEN is 6 space-separated fields
        if tokens.len() < 7 {
            return Err(UciError::InvalidFen {
                fen: tokens[1..].join(" "),
            });
        }
        let fen = tokens[1..7].join(" ");
        let board: Board = fen.parse().map_err(|_| UciError::InvalidFen {
            fen: fen.clone(),
        })?;
        (board, &tokens[7..])
    } else {
        return Err(UciError::MalformedPosition);
    };

    // Apply moves if present: "moves e2e4 d7d5 ..."
    if !rest.is_empty() && rest[0] == "moves" {
        for uci_str in &rest[1..] {
            let mv = Move::from_uci(uci_str, &board).ok_or_else(|| UciError::InvalidMove {
                uci_move: uci_str.to_string(),
            })?;
            board = board.make_move(mv);
        }
    }

    Ok(Command::Position(board))
}

fn parse_ms(tokens: &[&str], i: usize, param: &str) -> Result<Duration, UciError> {
    let value = tokens.get(i).ok_or_else(|| UciError::MissingGoValue {
        param: param.to_string(),
    })?;
    let ms: u64 = value.parse().map_err(|_| UciError::InvalidGoValue {
        param: param.to_string(),
        value: value.to_string(),
    })?;
    Ok(Duration::from_millis(ms))
}

fn parse_u32(tokens: &[&str], i: usize, param: &str) -> Result<u32, UciError> {
    let value = tokens.get(i).ok_or_else(|| UciError::MissingGoValue {
        param: param.to_string(),
    })?;
    value.parse().map_err(|_| UciError::InvalidGoValue {
        param: param.to_string(),
        value: value.to_string(),
    })
}

fn parse_u64(tokens: &[&str], i: usize, param: &str) -> Result<u64, UciError> {
    let value = tokens.get(i).ok_or_else(|| UciError::MissingGoValue {
        param: param.to_string(),
    })?;
    value.parse().map_err(|_| UciError::InvalidGoValue {
        param: param.to_string(),
        value: value.to_string(),
    })
}

fn parse_u8(tokens: &[&str], i: usize, param: &str) -> Result<u8, UciError> {
    let value = tokens.get(i).ok_or_else(|| UciError::MissingGoValue {
        param: param.to_string(),
    })?;
    value.parse().map_err(|_| UciError::InvalidGoValue {
        param: param.to_string(),
        value: value.to_string(),
    })
}

/// Parse the `go` command arguments into [`GoParams`].
///
/// Recognizes `depth`, `wtime`, `btime`, `winc`, `binc`, `movestogo`,
/// `movetime`, `nodes`, and `infinite`. `ponder` is accepted and ignored.
fn parse_go(tokens: &[&str]) -> Result<Command, UciError> {
    let mut params = GoParams::default();

    let mut i = 0;
    while i < tokens.len() {
        match tokens[i] {
            "depth" => {
                params.depth = Some(parse_u8(tokens, i + 1, "depth")?);
                i += 2;
            }
            "wtime" => {
                params.wtime = Some(parse_ms(tokens, i + 1, "wtime")?);
                i += 2;
            }
            "btime" => {
                params.btime = Some(parse_ms(tokens, i + 1, "btime")?);
                i += 2;
            }
            "winc" => {
                params.winc = Some(parse_ms(tokens, i + 1, "winc")?);
                i += 2;
            }
            "binc" => {
                params.binc = Some(parse_ms(tokens, i + 1, "binc")?);
                i += 2;
            }
            "movestogo" => {
                params.movestogo = Some(parse_u32(tokens, i + 1, "movestogo")?);
                i += 2;
            }
            "movetime" => {
                params.movetime = Some(parse_ms(tokens, i + 1, "movetime")?);
                i += 2;
            }
            "nodes" => {
                params.nodes = Some(parse_u64(tokens, i + 1, "nodes")?);
                i += 2;
            }
            "infinite" => {
                params.infinite = true;
                i += 1;
            }
            "ponder" => {
                // Pondering is not supported; accept and ignore the token.
                i += 1;
            }
            _ => {
                i += 1;
            }
        }
    }

    Ok(Command::Go(params))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_uci() {
        assert!(matches!(parse_command("uci").unwrap(), Command::Uci));
    }

    #[test]
    fn parse_isready() {
        assert!(matches!(parse_command("isready").unwrap(), Command::IsReady));
    }

    #[test]
    fn parse_quit() {
        assert!(matches!(parse_command("quit").unwrap(), Command::Quit));
    }

    #[test]
    fn parse_ucinewgame() {
        assert!(matches!(
            parse_command("ucinewgame").unwrap(),
            Command::UciNewGame
        ));
    }

    #[test]
    fn parse_position_startpos() {
        let cmd = parse_command("position startpos").unwrap();
        assert!(matches!(cmd, Command::Position(_)));
    }

    #[test]
    fn parse_position_startpos_with_moves() {
        let cmd = parse_command("position startpos moves e2e4 e7e5").unwrap();
        assert!(matches!(cmd, Command::Position(_)));
    }

    #[test]
    fn parse_position_fen() {
        let cmd = parse_command(
            "position fen rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1",
        )
        .unwrap();
        assert!(matches!(cmd, Command::Position(_)));
    }

    #[test]
    fn parse_go_depth() {
        let cmd = parse_command("go depth 6").unwrap();
        match cmd {
            Command::Go(params) => assert_eq!(params.depth, Some(6)),
            _ => panic!("expected Go"),
        }
    }

    #[test]
    fn parse_go_bare() {
        let cmd = parse_command("go").unwrap();
        match cmd {
            Command::Go(params) => {
                assert_eq!(params.depth, None);
                assert!(!params.infinite);
            }
            _ => panic!("expected Go with no limits"),
        }
    }

    #[test]
    fn parse_go_clock_params() {
        let cmd = parse_command("go wtime 60000 btime 55000 winc 1000 binc 1000 movestogo 20")
            .unwrap();
        match cmd {
            Command::Go(params) => {
                assert_eq!(params.wtime, Some(Duration::from_millis(60000)));
                assert_eq!(params.btime, Some(Duration::from_millis(55000)));
                assert_eq!(params.winc, Some(Duration::from_millis(1000)));
                assert_eq!(params.binc, Some(Duration::from_millis(1000)));
                assert_eq!(params.movestogo, Some(20));
            }
            _ => panic!("expected Go"),
        }
    }

    #[test]
    fn parse_go_movetime() {
        let cmd = parse_command("go movetime 5000").unwrap();
        match cmd {
            Command::Go(params) => assert_eq!(params.movetime, Some(Duration::from_millis(5000))),
            _ => panic!("expected Go"),
        }
    }

    #[test]
    fn parse_go_nodes() {
        let cmd = parse_command("go nodes 100000").unwrap();
        match cmd {
            Command::Go(params) => assert_eq!(params.nodes, Some(100_000)),
            _ => panic!("expected Go"),
        }
    }

    #[test]
    fn parse_go_infinite() {
        let cmd = parse_command("go infinite").unwrap();
        match cmd {
            Command::Go(params) => assert!(params.infinite),
            _ => panic!("expected Go"),
        }
    }

    #[test]
    fn parse_go_ponder_is_ignored_not_rejected() {
        let cmd = parse_command("go ponder wtime 60000 btime 60000").unwrap();
        match cmd {
            Command::Go(params) => assert_eq!(params.wtime, Some(Duration::from_millis(60000))),
            _ => panic!("expected Go"),
        }
    }

    #[test]
    fn parse_unknown_command() {
        let cmd = parse_command("foobar").unwrap();
        assert!(matches!(cmd, Command::Unknown(_)));
    }

    #[test]
    fn parse_empty_line() {
        let cmd = parse_command("").unwrap();
        assert!(matches!(cmd, Command::Unknown(_)));
    }

    #[test]
    fn parse_position_missing_keyword() {
        let result = parse_command("position");
        assert!(result.is_err());
    }

    #[test]
    fn parse_position_invalid_fen() {
        let result = parse_command("position fen invalid");
        assert!(result.is_err());
    }

    #[test]
    fn parse_stop() {
        assert!(matches!(parse_command("stop").unwrap(), Command::Stop));
    }
}
