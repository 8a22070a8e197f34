#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Ping,
    DetectEncoding,
    SessionState,
    LoadRows,
    Reset,
    Current,
    Save,
    Skip,
    Previous,
    Select,
    List,
    RunQa,
    ExportRender,
    ExportDownload,
    CopySource,
    Unknown,
}

impl From<&str> for Command {
    fn from(s: &str) -> Self {
        match s {
            "ping" => Command::Ping,
            "encoding.detect" | "detect_encoding" => Command::DetectEncoding,
            "session.state" => Command::SessionState,
            "session.load_rows" => Command::LoadRows,
            "session.reset" => Command::Reset,
            "review.current" => Command::Current,
            "review.save" => Command::Save,
            "review.skip" => Command::Skip,
            "review.previous" => Command::Previous,
            "review.select" => Command::Select,
            "review.list" => Command::List,
            "review.qa" | "run_qa" => Command::RunQa,
            "export.render" => Command::ExportRender,
            "export.download" => Command::ExportDownload,
            "clipboard.copy_source" => Command::CopySource,
            _ => Command::Unknown,
        }
    }
}
