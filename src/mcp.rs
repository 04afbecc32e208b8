//! Stdio MCP server: JSON-RPC messages framed with Content-Length headers
//! (bare JSON lines are tolerated for hand-driven testing), dispatching
//! tools/call into the execution layer.

use std::io::{self, BufRead, BufReader, Read, Write};

use crate::{execute_tool, tool_definitions_json, RuntimeConfig, ScriptRunner};

const MAX_MESSAGE_BYTES: usize = 10 * 1024 * 1024;

/// Read one framed message. `Ok(None)` means end of stream or a blank
/// separator line the caller should skip past.
pub(crate) fn read_mcp_message(
    reader: &mut BufReader<impl Read>,
) -> io::Result<Option<serde_json::Value>> {
    let mut first_line = String::new();
    if reader.read_line(&mut first_line)? == 0 {
        return Ok(None);
    }
    if first_line.trim().is_empty() {
        return Ok(None);
    }

    if !first_line.to_ascii_lowercase().starts_with("content-length:") {
        // Unframed fallback: one JSON document per line.
        let value = serde_json::from_str(first_line.trim()).map_err(|e| {
            io::Error::new(io::ErrorKind::InvalidData, format!("invalid json: {e}"))
        })?;
        return Ok(Some(value));
    }

    let mut content_length = parse_content_length(&first_line).unwrap_or(0);
    loop {
        let mut line = String::new();
        reader.read_line(&mut line)?;
        if line == "\r\n" || line == "\n" || line.is_empty() {
            break;
        }
        if line.to_ascii_lowercase().starts_with("content-length:") {
            content_length = parse_content_length(&line).unwrap_or(content_length);
        }
    }

    if content_length == 0 {
        return Ok(None);
    }
    if content_length > MAX_MESSAGE_BYTES {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("message too large ({content_length} bytes)"),
        ));
    }
    let mut buffer = vec![0u8; content_length];
    reader.read_exact(&mut buffer)?;
    let value = serde_json::from_slice(&buffer)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, format!("invalid json: {e}")))?;
    Ok(Some(value))
}

fn parse_content_length(line: &str) -> Option<usize> {
    line.split(':').nth(1).and_then(|v| v.trim().parse().ok())
}

pub(crate) fn write_mcp_response(
    writer: &mut impl Write,
    value: &serde_json::Value,
) -> io::Result<()> {
    let payload = serde_json::to_vec(value)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, format!("{e}")))?;
    write!(writer, "Content-Length: {}\r\n\r\n", payload.len())?;
    writer.write_all(&payload)?;
    writer.flush()
}

pub(crate) fn run_mcp_server(
    cfg: &RuntimeConfig,
    runner: &ScriptRunner,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut reader = BufReader::new(io::stdin());
    let mut writer = io::stdout();
    let tools = tool_definitions_json(cfg.preferences.as_deref());

    loop {
        let Some(msg) = read_mcp_message(&mut reader)? else {
            break;
        };
        let id = msg.get("id").cloned();
        let has_id = id.as_ref().is_some_and(|v| !v.is_null());
        let method = msg.get("method").and_then(|m| m.as_str()).unwrap_or("");
        let params = msg
            .get("params")
            .cloned()
            .unwrap_or_else(|| serde_json::json!({}));

        let response = match method {
            "initialize" => {
                let protocol = params
                    .get("protocolVersion")
                    .and_then(|v| v.as_str())
                    .unwrap_or("0.1");
                serde_json::json!({
                    "jsonrpc": "2.0",
                    "id": id,
                    "result": {
                        "protocolVersion": protocol,
                        "capabilities": {
                            "tools": {
                                "list": true,
                                "call": true
                            }
                        },
                        "serverInfo": {
                            "name": "mailpilot",
                            "version": env!("CARGO_PKG_VERSION")
                        }
                    }
                })
            }
            "tools/list" => serde_json::json!({
                "jsonrpc": "2.0",
                "id": id,
                "result": { "tools": tools.clone() }
            }),
            "tools/call" => {
                let name = params.get("name").and_then(|v| v.as_str()).unwrap_or("");
                let arguments = params
                    .get("arguments")
                    .cloned()
                    .unwrap_or_else(|| serde_json::json!({}));
                match execute_tool(name, arguments, runner, cfg) {
                    Ok(result) => serde_json::json!({
                        "jsonrpc": "2.0",
                        "id": id,
                        "result": {
                            "content": [
                                { "type": "text", "text": result.output }
                            ],
                            "details": result.details,
                            "isError": result.is_error
                        }
                    }),
                    Err(err) => serde_json::json!({
                        "jsonrpc": "2.0",
                        "id": id,
                        "error": { "code": -32000, "message": err }
                    }),
                }
            }
            "shutdown" => {
                let response = serde_json::json!({
                    "jsonrpc": "2.0",
                    "id": id,
                    "result": null
                });
                write_mcp_response(&mut writer, &response)?;
                break;
            }
            _ => {
                if !has_id {
                    // Notification we don't handle; nothing to answer.
                    continue;
                }
                serde_json::json!({
                    "jsonrpc": "2.0",
                    "id": id,
                    "error": { "code": -32601, "message": "method not found" }
                })
            }
        };

        if has_id || method == "initialize" || method == "tools/list" || method == "tools/call" {
            write_mcp_response(&mut writer, &response)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn framed_message_round_trips() {
        let value = serde_json::json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "tools/list"
        });
        let mut wire = Vec::new();
        write_mcp_response(&mut wire, &value).expect("write");

        let mut reader = BufReader::new(Cursor::new(wire));
        let read = read_mcp_message(&mut reader).expect("read").expect("some");
        assert_eq!(read, value);
    }

    #[test]
    fn bare_json_line_is_accepted() {
        let wire = b"{\"jsonrpc\":\"2.0\",\"id\":7,\"method\":\"shutdown\"}\n".to_vec();
        let mut reader = BufReader::new(Cursor::new(wire));
        let read = read_mcp_message(&mut reader).expect("read").expect("some");
        assert_eq!(read.get("id").and_then(|v| v.as_i64()), Some(7));
    }

    #[test]
    fn end_of_stream_is_none() {
        let mut reader = BufReader::new(Cursor::new(Vec::new()));
        assert!(read_mcp_message(&mut reader).expect("read").is_none());
    }

    #[test]
    fn header_case_is_ignored() {
        let body = br#"{"ok":true}"#;
        let mut wire = format!("content-length: {}\r\n\r\n", body.len()).into_bytes();
        wire.extend_from_slice(body);
        let mut reader = BufReader::new(Cursor::new(wire));
        let read = read_mcp_message(&mut reader).expect("read").expect("some");
        assert_eq!(read.get("ok").and_then(|v| v.as_bool()), Some(true));
    }

    #[test]
    fn oversized_frame_is_rejected() {
        let wire = format!("Content-Length: {}\r\n\r\n", MAX_MESSAGE_BYTES + 1).into_bytes();
        let mut reader = BufReader::new(Cursor::new(wire));
        assert!(read_mcp_message(&mut reader).is_err());
    }

    #[test]
    fn malformed_json_is_an_error() {
        let body = b"not json";
        let mut wire = format!("Content-Length: {}\r\n\r\n", body.len()).into_bytes();
        wire.extend_from_slice(body);
        let mut reader = BufReader::new(Cursor::new(wire));
        assert!(read_mcp_message(&mut reader).is_err());
    }
}
