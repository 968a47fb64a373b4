//! Emit one JSON object per frame for plotting camera motion.
//!
//! {"t":33333333,"d":0.0112,"tracking":true,"bytes":3840}
//!
//! Usage: cargo run --example stream_json > walk.jsonl

use arframe::sim::{walk, WalkParams};
use arframe::{FrameSession, SessionConfig};
use std::io::{self, Write};

fn main() {
    env_logger::init();

    let frames = walk(&WalkParams {
        frames: 120,
        step: [0.004, 0.001, -0.006],
        not_ready_every: 10,
        ..WalkParams::default()
    });
    let mut session = FrameSession::new(SessionConfig::from_env().with_log_every(0));

    let stdout = io::stdout();
    let mut out = io::BufWriter::new(stdout.lock());

    for frame in &frames {
        match session.on_frame_update(Some(frame)) {
            Ok(update) => {
                let _ = writeln!(
                    out,
                    "{{\"t\":{},\"d\":{:.4},\"tracking\":{},\"bytes\":{}}}",
                    update.timestamp_ns.unwrap_or(0),
                    update.distance_m.unwrap_or(0.0),
                    session.tracker().is_tracking(),
                    update.packed_len,
                );
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                break;
            }
        }
    }
    let _ = out.flush();
}
