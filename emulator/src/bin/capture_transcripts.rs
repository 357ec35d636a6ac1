use std::io;

#[allow(dead_code)]
#[path = "../session.rs"]
mod session;

use session::{Session, TranscriptProfile};

fn main() -> io::Result<()> {
    record_profile(TranscriptProfile::Stride)?;
    record_profile(TranscriptProfile::Consolidate)?;
    record_profile(TranscriptProfile::Replay)?;
    Ok(())
}

fn record_profile(profile: TranscriptProfile) -> io::Result<()> {
    let mut session = Session::new(profile)?;
    match profile {
        TranscriptProfile::Stride => record_stride(&mut session),
        TranscriptProfile::Consolidate => record_consolidate(&mut session),
        TranscriptProfile::Replay => record_replay(&mut session),
    }
}

fn record_stride(session: &mut Session) -> io::Result<()> {
    session.handle_completion("ho", 2)?;
    session.handle_completion("hold ", "hold ".len())?;
    session.handle_completion("hold q", "hold q".len())?;
    session.handle_completion("st", 2)?;
    session.handle_completion("step ", "step ".len())?;
    session.handle_completion("step c", "step c".len())?;

    let _ = session.handle_command("hold qp 7")?;
    let _ = session.handle_command("hold none 2")?;
    let _ = session.handle_command("hold wo 7")?;
    let _ = session.handle_command("hold none 2")?;
    let _ = session.handle_command("plan show")?;
    let _ = session.handle_command("step count=9")?;
    let _ = session.handle_command("status")?;
    let _ = session.handle_command("step all")?;
    let _ = session.handle_command("status")?;
    Ok(())
}

fn record_consolidate(session: &mut Session) -> io::Result<()> {
    session.handle_completion("pl", 2)?;
    session.handle_completion("plan ", "plan ".len())?;
    session.handle_completion("plan c", "plan c".len())?;
    session.handle_completion("plan co", "plan co".len())?;

    let _ = session.handle_command("hold q 3")?;
    let _ = session.handle_command("hold q 2")?;
    let _ = session.handle_command("hold w 0")?;
    let _ = session.handle_command("hold o 5")?;
    let _ = session.handle_command("plan show")?;
    let _ = session.handle_command("plan consolidate")?;
    let _ = session.handle_command("plan show")?;
    let _ = session.handle_command("step all")?;
    Ok(())
}

fn record_replay(session: &mut Session) -> io::Result<()> {
    session.handle_completion("help ", "help ".len())?;

    let _ = session.handle_command("hold qp 4")?;
    let _ = session.handle_command("hold none 2")?;
    let _ = session.handle_command("hold wo 4")?;
    let _ = session.handle_command("step count=5")?;
    let _ = session.handle_command("status")?;
    let _ = session.handle_command("plan reset")?;
    let _ = session.handle_command("status")?;
    let _ = session.handle_command("step all")?;
    let _ = session.handle_command("plan show")?;
    let _ = session.handle_command("help step")?;
    Ok(())
}
