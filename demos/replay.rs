//! Replay a synthetic camera walk through a frame session, like a host render loop.
//!
//! Usage: RUST_LOG=info cargo run --example replay

use arframe::sim::{walk, HostStream, WalkParams};
use arframe::{ArFrameError, FrameSession, SessionConfig, UpdateEvents};
use std::time::{Duration, Instant};

fn main() {
    env_logger::init();

    let frames = walk(&WalkParams {
        frames: 200,
        width: 320,
        height: 240,
        not_ready_every: 7,
        ..WalkParams::default()
    });

    // Every 50th tick the host has no frame.
    let script = frames
        .into_iter()
        .enumerate()
        .flat_map(|(i, f)| {
            if i > 0 && i % 50 == 0 {
                vec![None, Some(f)]
            } else {
                vec![Some(f)]
            }
        })
        .collect();

    let stream = match HostStream::start(script, Duration::from_millis(5)) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Failed to start host: {}", e);
            std::process::exit(1);
        }
    };

    let mut session = FrameSession::new(SessionConfig::from_env().with_log_every(30));
    let start = Instant::now();
    let mut not_ready = 0u64;

    loop {
        let tick = match stream.recv_timeout(Duration::from_secs(2)) {
            Ok(tick) => tick,
            Err(ArFrameError::StreamStopped) => break,
            Err(e) => {
                eprintln!("Error: {}", e);
                break;
            }
        };

        let update = match session.on_frame_update(tick.as_ref()) {
            Ok(u) => u,
            Err(e) => {
                eprintln!("Frame error: {}", e);
                break;
            }
        };

        if update.tracking_changed() {
            println!(
                "tracking {} at t={:?}",
                if update.events.contains(UpdateEvents::TRACKING_STARTED) { "started" } else { "stopped" },
                update.timestamp_ns
            );
        }
        if update.events.contains(UpdateEvents::IMAGE_NOT_READY) {
            not_ready += 1;
        }
        if update.events.contains(UpdateEvents::BUFFER_GROWN) {
            println!("packed buffer grew to {} bytes", session.packed_buffer().capacity());
        }
    }

    let elapsed = start.elapsed().as_secs_f64();
    println!(
        "\nTotal: {} frames ({} packed, {} not ready) in {:.1}s, walked {:.3} m",
        session.frames_seen(),
        session.frames_packed(),
        not_ready,
        elapsed,
        session.total_distance_m()
    );
}
