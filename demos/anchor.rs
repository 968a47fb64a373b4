//! Report distance from an anchor pose set partway through a walk.
//!
//! Usage: cargo run --example anchor

use arframe::sim::{walk, WalkParams};
use arframe::{FrameSession, SessionConfig};

fn main() {
    env_logger::init();

    let frames = walk(&WalkParams {
        frames: 60,
        step: [0.02, 0.0, 0.01],
        ..WalkParams::default()
    });
    let mut session = FrameSession::new(SessionConfig::default().with_pack_images(false).with_log_every(0));

    for (i, frame) in frames.iter().enumerate() {
        if i == 20 {
            println!("anchor set at frame {}", i);
            session.set_anchor();
        }
        let update = match session.on_frame_update(Some(frame)) {
            Ok(u) => u,
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        };
        if let Some(d) = update.anchor_distance_m {
            if i % 10 == 0 {
                println!("frame {:>3}  distance={:.3}[m]", i, d);
            }
        }
    }
}
