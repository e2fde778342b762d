use chatipelago_admin::console::{LogBuffer, LogLevel, SseDecoder};
use pretty_assertions::assert_eq;

const EVENTS: &str = concat!(
    ": keep-alive\n\n",
    "data: {\"timestamp\":\"2026-10-18T12:00:00.000Z\",\"level\":\"info\",\"message\":\"Connected to Archipelago\"}\n\n",
    "event: log\n",
    "data: {\"timestamp\":\"2026-10-18T12:00:01.000Z\",\"level\":\"warn\",\"message\":\"Streamer.bot not reachable\"}\r\n\r\n",
    "data: not json\n\n",
    "data: {\"timestamp\":\"2026-10-18T12:00:02.000Z\",\"level\":\"error\",\"message\":\"Retry failed\"}\n\n",
);

#[test]
fn decodes_whole_stream() {
    let mut decoder = SseDecoder::new();
    let entries = decoder.feed(EVENTS.as_bytes());
    let levels: Vec<_> = entries.iter().map(|e| e.level).collect();
    assert_eq!(levels, vec![LogLevel::Info, LogLevel::Warn, LogLevel::Error]);
    assert_eq!(entries[1].message, "Streamer.bot not reachable");
    assert_eq!(decoder.finish(), None);
}

#[test]
fn chunk_boundaries_do_not_matter() {
    let bytes = EVENTS.as_bytes();
    for size in [1, 3, 7, 64] {
        let mut decoder = SseDecoder::new();
        let mut messages = Vec::new();
        for chunk in bytes.chunks(size) {
            messages.extend(decoder.feed(chunk).into_iter().map(|e| e.message));
        }
        assert_eq!(
            messages,
            vec![
                "Connected to Archipelago",
                "Streamer.bot not reachable",
                "Retry failed",
            ],
            "chunk size {size}"
        );
    }
}

#[test]
fn trailing_event_is_flushed_on_finish() {
    let mut decoder = SseDecoder::new();
    let partial =
        "data: {\"timestamp\":\"t\",\"level\":\"debug\",\"message\":\"last words\"}";
    assert!(decoder.feed(partial.as_bytes()).is_empty());
    let entry = decoder.finish().expect("pending event");
    assert_eq!(entry.message, "last words");
}

#[test]
fn buffer_filters_and_exports() {
    let mut decoder = SseDecoder::new();
    let mut buffer = LogBuffer::new(10);
    buffer.extend(decoder.feed(EVENTS.as_bytes()));

    let warnings: Vec<_> = buffer
        .filtered(Some(LogLevel::Warn))
        .map(|e| e.message.as_str())
        .collect();
    assert_eq!(warnings, vec!["Streamer.bot not reachable"]);
    assert_eq!(buffer.filtered(None).count(), 3);

    assert_eq!(
        buffer.export(),
        concat!(
            "[2026-10-18T12:00:00.000Z] [INFO] Connected to Archipelago\n",
            "[2026-10-18T12:00:01.000Z] [WARN] Streamer.bot not reachable\n",
            "[2026-10-18T12:00:02.000Z] [ERROR] Retry failed",
        )
    );

    buffer.clear();
    assert!(buffer.is_empty());
}
