//! Tapquest entry point
//!
//! Native builds run a small line-oriented driver over a file-backed save
//! directory. The browser build enters through `platform::wasm_start`.

#[cfg(not(target_arch = "wasm32"))]
mod repl {
    use std::io::{self, BufRead, Write};
    use std::path::PathBuf;

    use glam::Vec2;
    use tapquest::Game;
    use tapquest::platform::FileStore;
    use tapquest::settings::EconomyField;
    use tapquest::sim::{GameEvent, InteractableId, TickInput};

    /// Fixed frame step used to walk the player
    const FRAME_DT: f32 = 1.0 / 60.0;
    /// Give up on a walk after this many frames
    const MAX_WALK_FRAMES: usize = 60 * 60;

    const HELP: &str = "\
commands:
  tap <x> <y>          walk to a point
  interact <id>        use an object within reach
  swat                 shoo the bat
  quiz <subject>       take a quiz
  set <key> <value>    change an economy value
  status               show coins, moves and objects
  reset                wipe progress
  quit";

    pub fn data_dir() -> PathBuf {
        std::env::var_os("TAPQUEST_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("tapquest-data"))
    }

    pub fn run(seed: u64) -> io::Result<()> {
        let dir = data_dir();
        log::info!("Using save directory {}", dir.display());
        let mut game = Game::launch(FileStore::new(dir), seed);

        let stdin = io::stdin();
        let mut lines = stdin.lock().lines();
        let mut out = io::stdout();
        writeln!(out, "{HELP}")?;
        print_status(&game, &mut out)?;

        loop {
            write!(out, "> ")?;
            out.flush()?;
            let Some(line) = lines.next().transpose()? else {
                break;
            };
            let words: Vec<&str> = line.split_whitespace().collect();
            match words.as_slice() {
                [] => {}
                ["quit"] | ["exit"] => break,
                ["help"] => writeln!(out, "{HELP}")?,
                ["status"] => print_status(&game, &mut out)?,
                ["tap", x, y] => match (x.parse::<f32>(), y.parse::<f32>()) {
                    (Ok(x), Ok(y)) if x.is_finite() && y.is_finite() => {
                        walk(&mut game, Vec2::new(x, y), &mut out)?
                    }
                    _ => writeln!(out, "tap needs two finite numbers")?,
                },
                ["interact", id] => match game.interact(&InteractableId::from(*id)) {
                    Ok(success) => writeln!(out, "{} (balance {})", success.message, success.balance)?,
                    Err(rejection) => writeln!(out, "Can't: {rejection}")?,
                },
                ["swat"] => {
                    if game.swat_bat() {
                        writeln!(out, "The bat flaps away.")?;
                    } else {
                        writeln!(out, "There's no bat.")?;
                    }
                }
                ["quiz", subject @ ..] if !subject.is_empty() => {
                    take_quiz(&mut game, &subject.join(" "), &mut lines, &mut out)?
                }
                ["set", key, value] => match (EconomyField::from_key(key), value.parse::<i64>()) {
                    (Some(field), Ok(value)) => {
                        let applied = game.set_economy_value(field, value);
                        writeln!(out, "{key} = {applied}")?;
                    }
                    (None, _) => writeln!(out, "Unknown economy key '{key}'")?,
                    (_, Err(_)) => writeln!(out, "'{value}' is not a number")?,
                },
                ["reset"] => {
                    game.reset_progress();
                    writeln!(out, "Progress wiped.")?;
                }
                _ => writeln!(out, "Unknown command, try 'help'")?,
            }
        }

        if !game.flush() {
            log::warn!("Final save failed");
        }
        Ok(())
    }

    fn walk(game: &mut Game<FileStore>, target: Vec2, out: &mut impl Write) -> io::Result<()> {
        let mut input = TickInput {
            tap_target: Some(target),
        };
        for _ in 0..MAX_WALK_FRAMES {
            let events = game.tick(&input, FRAME_DT);
            input.tap_target = None;
            for event in &events {
                print_event(event, out)?;
            }
            if !game.state().player.is_walking() {
                break;
            }
        }
        let pos = game.player_position();
        writeln!(out, "You are at ({:.0}, {:.0})", pos.x, pos.y)
    }

    fn print_event(event: &GameEvent, out: &mut impl Write) -> io::Result<()> {
        match event {
            GameEvent::MoveCompleted { count } => writeln!(out, "Move {count} done."),
            GameEvent::Respawned { id } => writeln!(out, "{id} is back."),
            GameEvent::BatArrived => writeln!(out, "A bat swoops in! ('swat' it before your next move)"),
            GameEvent::BatBite { penalty, balance } => {
                writeln!(out, "The bat bit you: -{penalty} coins, {balance} left.")
            }
            GameEvent::SepticOverdue => writeln!(out, "The septic tank needs pumping."),
            GameEvent::SepticOverflow { penalty, balance } => {
                writeln!(out, "The septic tank overflowed: -{penalty} coins, {balance} left.")
            }
        }
    }

    fn print_status(game: &Game<FileStore>, out: &mut impl Write) -> io::Result<()> {
        let state = game.state();
        let pos = game.player_position();
        writeln!(
            out,
            "coins {}  moves {}  at ({:.0}, {:.0})",
            state.coins(),
            state.completed_moves(),
            pos.x,
            pos.y
        )?;
        for config in state.registry.configs() {
            let Some(runtime) = state.registry.state(&config.id) else {
                continue;
            };
            let distance = tapquest::distance(pos, runtime.position);
            match runtime.respawn_at_move {
                Some(at) if runtime.hidden => {
                    writeln!(out, "  {:<14} back at move {}", config.id, at)?
                }
                _ => writeln!(
                    out,
                    "  {:<14} ({:.0}, {:.0})  {:.0} away",
                    config.id, runtime.position.x, runtime.position.y, distance
                )?,
            }
        }
        if state.minigames.bat.active {
            writeln!(out, "  a bat is circling")?;
        }
        Ok(())
    }

    fn take_quiz(
        game: &mut Game<FileStore>,
        subject: &str,
        lines: &mut impl Iterator<Item = io::Result<String>>,
        out: &mut impl Write,
    ) -> io::Result<()> {
        let Some(mut session) = game.start_quiz(subject) else {
            let subjects = game.bank().subjects().join(", ");
            return writeln!(out, "Not enough questions on '{subject}'. Try: {subjects}");
        };
        session.start();

        for i in 0..session.questions().len() {
            let question = &session.questions()[i];
            writeln!(out, "\nQ{}: {}", i + 1, question.prompt)?;
            for (n, option) in question.options.iter().enumerate() {
                writeln!(out, "  {}) {}", n + 1, option)?;
            }
            let option_count = question.options.len();
            loop {
                write!(out, "answer> ")?;
                out.flush()?;
                let Some(line) = lines.next().transpose()? else {
                    return writeln!(out, "Quiz abandoned.");
                };
                match line.trim().parse::<usize>() {
                    Ok(n) if (1..=option_count).contains(&n) => {
                        if let Err(e) = session.answer(i, n - 1) {
                            writeln!(out, "{e}")?;
                            continue;
                        }
                        break;
                    }
                    _ => writeln!(out, "Pick 1-{option_count}")?,
                }
            }
            session.next();
        }

        match game.submit_quiz(&mut session) {
            Ok(submission) => {
                let result = &submission.result;
                writeln!(
                    out,
                    "\n{}/{} correct ({}%), +{} coins. {} overall: {}%",
                    result.correct_count,
                    result.question_count,
                    result.percent_correct(),
                    submission.coins_awarded,
                    result.subject,
                    result.stats.percent_correct()
                )
            }
            Err(e) => writeln!(out, "Couldn't submit: {e}"),
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Tapquest (native) starting...");

    let seed = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);

    if let Err(e) = repl::run(seed) {
        log::error!("Terminal I/O failed: {}", e);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Browser entry is platform::wasm_start
}
