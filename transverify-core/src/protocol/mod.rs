use std::path::PathBuf;

use serde_json::{json, Value};

use crate::config::AppConfig;
use crate::error::{Result, ReviewError};
use crate::parsers::csv_rows::{self, ExtractProgress};
use crate::services::clipboard::CommandClipboard;
use crate::services::export::FileDownloadSink;
use crate::services::persistence::FileSessionStore;
use crate::services::session::{ReviewSession, SessionPorts, Side};
use crate::services::{encoding, qa};

mod command;
use command::Command;

/// Everything a request handler may touch.
pub struct Runtime {
    pub config: AppConfig,
    pub session: ReviewSession,
}

impl Runtime {
    /// Wire the file-backed ports described by `config` and resume the stored session.
    pub fn new(config: AppConfig) -> Self {
        let ports = SessionPorts {
            store: Box::new(FileSessionStore::new(config.storage.dir.clone())),
            clipboard: Box::new(CommandClipboard::new(config.clipboard.command.clone())),
            sink: Box::new(FileDownloadSink::new(config.export.dir.clone())),
        };
        let session = ReviewSession::open(
            config.storage.session_key.clone(),
            ports,
            config.export.dialect,
        );
        Self { config, session }
    }

    pub fn with_session(config: AppConfig, session: ReviewSession) -> Self {
        Self { config, session }
    }
}

fn get_cmd(req: &Value) -> &str {
    req.get("cmd").and_then(|v| v.as_str()).unwrap_or("")
}

fn get_id(req: &Value) -> Value {
    req.get("id").cloned().unwrap_or(Value::Null)
}

fn get_payload(req: &Value) -> &Value {
    static EMPTY: Value = Value::Null;
    req.get("payload").unwrap_or(&EMPTY)
}

fn str_field<'a>(payload: &'a Value, name: &str) -> Option<&'a str> {
    payload.get(name).and_then(|v| v.as_str())
}

fn ok(id: Value, payload: Value) -> String {
    json!({
        "id": id,
        "status": "ok",
        "payload": payload
    })
    .to_string()
}

fn err(id: Value, message: impl Into<String>) -> String {
    json!({
        "id": id,
        "status": "error",
        "message": message.into()
    })
    .to_string()
}

fn event(id: &Value, name: &str, payload: Value) -> String {
    json!({
        "id": id,
        "event": name,
        "payload": payload
    })
    .to_string()
}

/// Handle one request line. Progress events go through `emit` before the response.
pub fn handle(input: &str, rt: &mut Runtime, emit: &mut dyn FnMut(String)) -> String {
    let req: Value = match serde_json::from_str(input) {
        Ok(v) => v,
        Err(_) => {
            return json!({
                "status": "error",
                "message": "invalid json"
            })
            .to_string();
        }
    };

    let id = get_id(&req);
    let cmd_str = get_cmd(&req);
    let payload = get_payload(&req);

    let cmd = Command::from(cmd_str);
    tracing::debug!("request {id} {cmd:?}");

    match dispatch(cmd, &id, payload, rt, emit) {
        Ok(body) => ok(id, body),
        Err(e) => {
            tracing::warn!("{cmd_str} failed: {e}");
            err(id, e.to_string())
        }
    }
}

fn dispatch(
    cmd: Command,
    id: &Value,
    payload: &Value,
    rt: &mut Runtime,
    emit: &mut dyn FnMut(String),
) -> Result<Value> {
    match cmd {
        Command::Ping => Ok(json!({ "message": "transverify-core alive" })),

        Command::DetectEncoding => {
            let path = str_field(payload, "path")
                .filter(|p| !p.is_empty())
                .ok_or_else(|| ReviewError::InvalidRequest("payload.path is required".into()))?;
            let result = encoding::detect_from_file(&PathBuf::from(path))?;
            Ok(serde_json::to_value(result)?)
        }

        Command::SessionState => Ok(serde_json::to_value(rt.session.state())?),

        Command::LoadRows => load_rows(id, payload, rt, emit),

        Command::Reset => {
            rt.session.reset()?;
            Ok(serde_json::to_value(rt.session.state())?)
        }

        Command::Current => Ok(current(rt)),

        Command::Save => {
            let text = payload
                .get("text")
                .and_then(|v| v.as_str())
                .ok_or_else(|| ReviewError::InvalidRequest("payload.text is required".into()))?;
            rt.session.save_current(text)?;
            Ok(current(rt))
        }

        Command::Skip => {
            rt.session.skip()?;
            Ok(current(rt))
        }

        Command::Previous => {
            rt.session.previous()?;
            Ok(current(rt))
        }

        Command::Select => {
            let index = payload
                .get("index")
                .and_then(|v| v.as_u64())
                .ok_or_else(|| ReviewError::InvalidRequest("payload.index is required".into()))?;
            rt.session.select(index as usize)?;
            Ok(current(rt))
        }

        Command::List => Ok(json!({ "entries": rt.session.overview() })),

        Command::RunQa => Ok(json!({ "issues": qa::run(rt.session.store().pairs()) })),

        Command::ExportRender => Ok(json!({ "text": rt.session.export()? })),

        Command::ExportDownload => {
            let file_name = str_field(payload, "filename")
                .filter(|f| !f.trim().is_empty())
                .unwrap_or(rt.config.export.file_name.as_str())
                .to_string();
            let download = rt.session.download(&file_name)?;
            Ok(serde_json::to_value(download)?)
        }

        Command::CopySource => Ok(json!({ "copied": rt.session.copy_source() })),

        Command::Unknown => Err(ReviewError::InvalidRequest("unknown command".into())),
    }
}

fn load_rows(
    id: &Value,
    payload: &Value,
    rt: &mut Runtime,
    emit: &mut dyn FnMut(String),
) -> Result<Value> {
    let side: Side = payload
        .get("side")
        .cloned()
        .ok_or_else(|| ReviewError::InvalidRequest("payload.side is required".into()))
        .and_then(|v| {
            serde_json::from_value(v)
                .map_err(|e| ReviewError::InvalidRequest(format!("invalid payload.side: {e}")))
        })?;

    let input = &rt.config.input;
    let mut on_chunk = |p: ExtractProgress| {
        emit(event(
            id,
            "progress",
            json!({ "side": side, "rows_loaded": p.rows_loaded, "chunk": p.chunk }),
        ));
    };

    let (rows, encoding) = if let Some(path) = str_field(payload, "path") {
        csv_rows::load_file(
            &PathBuf::from(path),
            &input.column,
            input.dialect,
            input.chunk_size,
            &mut on_chunk,
        )?
    } else if let Some(text) = str_field(payload, "text") {
        let stream = csv_rows::extract_rows(text, &input.column, input.dialect)?;
        let rows = csv_rows::collect_chunked(stream, input.chunk_size, &mut on_chunk)?;
        (rows, "utf-8".to_string())
    } else {
        return Err(ReviewError::InvalidRequest(
            "payload.path or payload.text is required".into(),
        ));
    };

    let rows_loaded = rows.len();
    let built = rt.session.load_rows(side, rows);

    Ok(json!({
        "side": side,
        "rows": rows_loaded,
        "encoding": encoding,
        "built": built,
        "state": rt.session.state(),
    }))
}

fn current(rt: &Runtime) -> Value {
    let state = rt.session.state();
    match rt.session.current() {
        Some(pair) => json!({
            "index": state.cursor,
            "pair": pair,
            "editable_text": pair.editable_text(),
            "can_go_previous": state.can_go_previous,
            "progress": state.progress,
        }),
        None => json!({
            "index": null,
            "pair": null,
            "can_go_previous": false,
            "progress": state.progress,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Dialect;
    use crate::services::persistence::MemorySessionStore;

    fn runtime(dir: &std::path::Path) -> Runtime {
        let mut config = AppConfig::default();
        config.storage.dir = dir.join("data");
        config.export.dir = dir.join("exports");
        config.input.chunk_size = 1;

        let ports = SessionPorts {
            store: Box::new(MemorySessionStore::new()),
            clipboard: Box::new(CommandClipboard::new(Vec::new())),
            sink: Box::new(FileDownloadSink::new(config.export.dir.clone())),
        };
        let session = ReviewSession::open("transVerifyData", ports, Dialect::Naive);
        Runtime::with_session(config, session)
    }

    fn call(rt: &mut Runtime, line: &str) -> (Value, Vec<Value>) {
        let mut events = Vec::new();
        let response = handle(line, rt, &mut |e: String| {
            events.push(serde_json::from_str::<Value>(&e).unwrap())
        });
        (serde_json::from_str(&response).unwrap(), events)
    }

    #[test]
    fn rejects_garbage_and_unknown_commands() {
        let dir = tempfile::tempdir().unwrap();
        let mut rt = runtime(dir.path());

        let (resp, _) = call(&mut rt, "not json");
        assert_eq!(resp["message"], "invalid json");

        let (resp, _) = call(&mut rt, r#"{"id":1,"cmd":"nope"}"#);
        assert_eq!(resp["status"], "error");
        assert_eq!(resp["id"], 1);
    }

    #[test]
    fn full_review_over_the_wire() {
        let dir = tempfile::tempdir().unwrap();
        let mut rt = runtime(dir.path());

        let (resp, events) = call(
            &mut rt,
            r#"{"id":1,"cmd":"session.load_rows","payload":{"side":"english","text":"text\nhello\nworld"}}"#,
        );
        assert_eq!(resp["status"], "ok");
        assert_eq!(resp["payload"]["built"], false);
        assert_eq!(events.len(), 2);
        assert_eq!(events[1]["event"], "progress");
        assert_eq!(events[1]["payload"]["rows_loaded"], 2);

        let (resp, _) = call(
            &mut rt,
            r#"{"id":2,"cmd":"session.load_rows","payload":{"side":"ar","text":"id,TEXT\n1,مرحبا\n2,عالم"}}"#,
        );
        assert_eq!(resp["payload"]["built"], true);

        let (resp, _) = call(&mut rt, r#"{"id":3,"cmd":"review.current"}"#);
        assert_eq!(resp["payload"]["index"], 0);
        assert_eq!(resp["payload"]["editable_text"], "مرحبا");

        let (resp, _) = call(
            &mut rt,
            r#"{"id":4,"cmd":"review.save","payload":{"text":"أهلاً"}}"#,
        );
        assert_eq!(resp["payload"]["index"], 1);
        assert_eq!(resp["payload"]["progress"]["verified"], 1);

        let (resp, _) = call(&mut rt, r#"{"id":5,"cmd":"review.previous"}"#);
        assert_eq!(resp["payload"]["index"], 0);
        assert_eq!(resp["payload"]["editable_text"], "أهلاً");

        let (resp, _) = call(&mut rt, r#"{"id":6,"cmd":"review.list"}"#);
        assert_eq!(resp["payload"]["entries"][0]["verified"], true);
        assert_eq!(resp["payload"]["entries"][0]["is_current"], true);

        let (resp, _) = call(&mut rt, r#"{"id":7,"cmd":"export.download"}"#);
        assert_eq!(resp["payload"]["file_name"], "arabic_translations_reviewed.csv");
        let written = std::fs::read_to_string(
            dir.path()
                .join("exports")
                .join("arabic_translations_reviewed.csv"),
        )
        .unwrap();
        assert_eq!(
            written,
            "text,text_verified,verified\n\"أهلاً\",\"\",\"true\"\n\"\",\"\",\"false\""
        );
    }

    #[test]
    fn schema_errors_reach_the_reviewer() {
        let dir = tempfile::tempdir().unwrap();
        let mut rt = runtime(dir.path());

        let (resp, events) = call(
            &mut rt,
            r#"{"id":1,"cmd":"session.load_rows","payload":{"side":"english","text":"body\nhello"}}"#,
        );
        assert_eq!(resp["status"], "error");
        assert_eq!(resp["message"], "CSV must contain a \"text\" column");
        assert!(events.is_empty());

        let (resp, _) = call(&mut rt, r#"{"id":2,"cmd":"session.state"}"#);
        assert_eq!(resp["payload"]["english_rows"], 0);
        assert_eq!(resp["payload"]["initialized"], false);
    }

    #[test]
    fn review_without_pairs_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut rt = runtime(dir.path());

        let (resp, _) = call(&mut rt, r#"{"id":1,"cmd":"review.skip"}"#);
        assert_eq!(resp["message"], "no review session loaded");

        let (resp, _) = call(&mut rt, r#"{"id":2,"cmd":"review.current"}"#);
        assert_eq!(resp["status"], "ok");
        assert!(resp["payload"]["pair"].is_null());

        let (resp, _) = call(&mut rt, r#"{"id":3,"cmd":"clipboard.copy_source"}"#);
        assert_eq!(resp["payload"]["copied"], false);
    }

    #[test]
    fn select_out_of_range_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let mut rt = runtime(dir.path());
        rt.session
            .load_rows(Side::English, vec!["a".into(), "b".into()]);
        rt.session
            .load_rows(Side::Arabic, vec!["أ".into(), "ب".into()]);

        let (resp, _) = call(
            &mut rt,
            r#"{"id":1,"cmd":"review.select","payload":{"index":9}}"#,
        );
        assert_eq!(resp["status"], "error");

        let (resp, _) = call(
            &mut rt,
            r#"{"id":2,"cmd":"review.select","payload":{"index":1}}"#,
        );
        assert_eq!(resp["payload"]["index"], 1);
    }

    #[test]
    fn load_rows_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut rt = runtime(dir.path());
        let path = dir.path().join("english.csv");
        std::fs::write(&path, "text\nhello\n").unwrap();

        let line = json!({
            "id": 1,
            "cmd": "session.load_rows",
            "payload": { "side": "english", "path": path },
        })
        .to_string();
        let (resp, _) = call(&mut rt, &line);
        assert_eq!(resp["payload"]["rows"], 1);
    }
}
