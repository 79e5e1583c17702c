//! Send one skeleton and one label through a running store and read them back.
//!
//! ```text
//! POSEQUEUE_HOST=127.0.0.1 POSEQUEUE_PORT=6379 cargo run -p posequeue --example pose-and-label
//! ```

use std::env;

use posequeue::transport::DEFAULT_PORT;
use posequeue::{PoseTransport, TransportConfig};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let host = env::var("POSEQUEUE_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port = match env::var("POSEQUEUE_PORT") {
        Ok(port) => port.parse()?,
        Err(_) => DEFAULT_PORT,
    };

    let mut transport = PoseTransport::open_with_config(TransportConfig::new(host, port))?;

    let bbox = [289.0, 1035.0, 174.0, 540.0];
    let keypoints: Vec<[f64; 2]> = (0..17)
        .map(|i| [1130.0 + f64::from(i) * 2.0, 341.0 + f64::from(i) * 26.0])
        .collect();
    let scores = vec![0.9; 17];

    transport.send_pose(3, 0, &bbox, &keypoints, &scores)?;
    if let Some(pose) = transport.receive_pose()? {
        println!(
            "pose frame={} person={} first keypoint={:?}",
            pose.frame_id, pose.person_id, pose.keypoints[0]
        );
    }

    transport.send_label("Falling", &bbox)?;
    if let Some(label) = transport.receive_label()? {
        println!("label {:?} bbox={:?}", label.label, label.bounding_box);
    }

    Ok(())
}
