#[cfg(feature = "schema")]
use std::sync::Arc;

use posequeue_channel::ChannelConfig;
use posequeue_envelope::{encode_label, encode_pose, LabelRecord, PoseObservation};

use crate::error::{Error, Result};
use crate::lane::Lane;

/// Queue that carries pose observations unless configured otherwise.
pub const DEFAULT_POSE_QUEUE: &str = "skeletons";

/// Queue that carries labels unless configured otherwise.
pub const DEFAULT_LABEL_QUEUE: &str = "labels";

/// Store location plus the two queue names.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub channel: ChannelConfig,
    pub pose_queue: String,
    pub label_queue: String,
}

impl TransportConfig {
    /// Default queues on `host:port`, database 0.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            channel: ChannelConfig::new(host, port),
            ..Self::default()
        }
    }

    pub fn with_database(mut self, database: u32) -> Self {
        self.channel.database = database;
        self
    }

    pub fn with_queues(mut self, pose_queue: impl Into<String>, label_queue: impl Into<String>) -> Self {
        self.pose_queue = pose_queue.into();
        self.label_queue = label_queue.into();
        self
    }
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            channel: ChannelConfig::default(),
            pose_queue: DEFAULT_POSE_QUEUE.to_string(),
            label_queue: DEFAULT_LABEL_QUEUE.to_string(),
        }
    }
}

/// Records waiting in each queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct QueueDepths {
    pub pose: u64,
    pub label: u64,
}

/// Typed send/receive of poses and labels over two queues.
///
/// Each record type has its own queue and connection; traffic on one never
/// shows up on the other. Every send validates before anything is pushed and
/// every receive validates what it pops. Receives never block: `Ok(None)`
/// means the queue is empty.
#[derive(Debug)]
pub struct PoseTransport {
    poses: Lane<PoseObservation>,
    labels: Lane<LabelRecord>,
}

impl PoseTransport {
    /// Open the pose and label queues on `host:port`, database `database`.
    ///
    /// Fails with a connection error if the store is unreachable.
    pub fn open(
        host: &str,
        port: u16,
        database: u32,
        pose_queue: &str,
        label_queue: &str,
    ) -> Result<Self> {
        let config = TransportConfig::new(host, port)
            .with_database(database)
            .with_queues(pose_queue, label_queue);
        Self::open_with_config(config)
    }

    /// Open with explicit configuration.
    pub fn open_with_config(config: TransportConfig) -> Result<Self> {
        if config.pose_queue == config.label_queue {
            return Err(Error::QueueConflict(config.pose_queue));
        }

        let poses = Lane::open(config.pose_queue, config.channel.clone())?;
        let labels = Lane::open(config.label_queue, config.channel)?;
        Ok(Self { poses, labels })
    }

    /// Join two lanes into a transport.
    pub fn from_lanes(poses: Lane<PoseObservation>, labels: Lane<LabelRecord>) -> Result<Self> {
        if poses.queue() == labels.queue() {
            return Err(Error::QueueConflict(poses.queue().to_string()));
        }
        Ok(Self { poses, labels })
    }

    /// Check received payloads of both queues against `registry`.
    #[cfg(feature = "schema")]
    pub fn with_schema_registry(self, registry: Arc<posequeue_schema::SchemaRegistry>) -> Self {
        Self {
            poses: self.poses.with_schema_registry(Arc::clone(&registry)),
            labels: self.labels.with_schema_registry(registry),
        }
    }

    /// Validate raw pose data and push it onto the pose queue.
    ///
    /// `bounding_box` must hold 4 values, `keypoints` 17 pairs and
    /// `keypoint_scores` 17 values; otherwise nothing is sent.
    pub fn send_pose<K: AsRef<[f64]>>(
        &mut self,
        frame_id: u64,
        person_id: i64,
        bounding_box: &[f64],
        keypoints: &[K],
        keypoint_scores: &[f64],
    ) -> Result<()> {
        let envelope = encode_pose(frame_id, person_id, bounding_box, keypoints, keypoint_scores)?;
        self.poses.push_envelope(&envelope)?;
        Ok(())
    }

    pub fn send_pose_observation(&mut self, pose: &PoseObservation) -> Result<()> {
        self.poses.send(pose)?;
        Ok(())
    }

    /// Pop the oldest pose, or `None` when the pose queue is empty.
    pub fn receive_pose(&mut self) -> Result<Option<PoseObservation>> {
        self.poses.receive()
    }

    /// Validate a label and push it onto the label queue.
    pub fn send_label(&mut self, label: &str, bounding_box: &[f64]) -> Result<()> {
        let envelope = encode_label(label, bounding_box)?;
        self.labels.push_envelope(&envelope)?;
        Ok(())
    }

    pub fn send_label_record(&mut self, label: &LabelRecord) -> Result<()> {
        self.labels.send(label)?;
        Ok(())
    }

    /// Pop the oldest label, or `None` when the label queue is empty.
    pub fn receive_label(&mut self) -> Result<Option<LabelRecord>> {
        self.labels.receive()
    }

    pub fn queue_depths(&mut self) -> Result<QueueDepths> {
        Ok(QueueDepths {
            pose: self.poses.depth()?,
            label: self.labels.depth()?,
        })
    }

    /// Check that the store answers on both connections.
    pub fn ping(&mut self) -> Result<()> {
        self.poses.ping()?;
        self.labels.ping()
    }

    pub fn poses(&mut self) -> &mut Lane<PoseObservation> {
        &mut self.poses
    }

    pub fn labels(&mut self) -> &mut Lane<LabelRecord> {
        &mut self.labels
    }

    /// Hand out both lanes, for example to drive them from two threads.
    pub fn split(self) -> (Lane<PoseObservation>, Lane<LabelRecord>) {
        (self.poses, self.labels)
    }
}

#[cfg(test)]
mod tests {
    use posequeue_channel::mock::MockStore;

    use super::*;

    fn transport(store: &MockStore) -> PoseTransport {
        PoseTransport::open_with_config(TransportConfig {
            channel: store.channel_config(),
            ..TransportConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn default_queue_names() {
        let config = TransportConfig::default();
        assert_eq!(config.pose_queue, "skeletons");
        assert_eq!(config.label_queue, "labels");
    }

    #[test]
    fn identical_queues_are_rejected_before_connecting() {
        let config = TransportConfig::new("127.0.0.1", 1).with_queues("same", "same");
        assert!(matches!(
            PoseTransport::open_with_config(config),
            Err(Error::QueueConflict(ref queue)) if queue == "same"
        ));
    }

    #[test]
    fn invalid_label_is_not_sent() {
        let store = MockStore::start().unwrap();
        let mut transport = transport(&store);

        let err = transport.send_label("Falling", &[1.0, 2.0]).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert_eq!(store.len(0, "labels"), 0);
    }

    #[test]
    fn depths_track_each_queue() {
        let store = MockStore::start().unwrap();
        let mut transport = transport(&store);
        transport.send_label("Walking", &[0.0, 0.0, 1.0, 1.0]).unwrap();
        transport.send_label("Falling", &[0.0, 0.0, 1.0, 1.0]).unwrap();

        assert_eq!(
            transport.queue_depths().unwrap(),
            QueueDepths { pose: 0, label: 2 }
        );
        transport.ping().unwrap();
    }

    #[test]
    fn lanes_can_be_rejoined() {
        let store = MockStore::start().unwrap();
        let (poses, labels) = transport(&store).split();
        assert_eq!(poses.queue(), "skeletons");
        assert_eq!(labels.queue(), "labels");

        let mut transport = PoseTransport::from_lanes(poses, labels).unwrap();
        assert_eq!(transport.receive_label().unwrap(), None);
    }
}
