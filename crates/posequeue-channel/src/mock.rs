//! In-process store for tests.
//!
//! [`MockStore`] speaks enough RESP2 for a [`QueueChannel`](crate::QueueChannel):
//! `PING`, `SELECT`, `LPUSH`, `RPOP`, `LLEN` and `DEL`, with one set of lists
//! per logical database. It listens on an ephemeral loopback port and serves
//! each connection on its own thread.

use std::collections::{HashMap, VecDeque};
use std::io::{self, ErrorKind};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use bytes::Bytes;
use posequeue_resp::{CommandWriter, Reply, ReplyReader, RespError};

use crate::config::ChannelConfig;

/// Logical databases offered, like a default store.
const DATABASES: u32 = 16;

const POLL_INTERVAL: Duration = Duration::from_millis(20);

type Lists = HashMap<(u32, String), VecDeque<Bytes>>;

#[derive(Default)]
struct State {
    lists: Mutex<Lists>,
    injected_error: Mutex<Option<String>>,
    shutdown: AtomicBool,
    generation: AtomicU64,
    active: AtomicUsize,
    accepted: AtomicUsize,
}

impl State {
    fn lists(&self) -> MutexGuard<'_, Lists> {
        self.lists.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn take_injected_error(&self) -> Option<String> {
        self.injected_error
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take()
    }
}

/// A RESP list store on `127.0.0.1`, stopped on drop.
pub struct MockStore {
    addr: SocketAddr,
    state: Arc<State>,
    acceptor: Option<JoinHandle<()>>,
}

impl MockStore {
    /// Bind an ephemeral port and start accepting connections.
    pub fn start() -> io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0")?;
        listener.set_nonblocking(true)?;
        let addr = listener.local_addr()?;
        let state = Arc::new(State::default());

        let acceptor = {
            let state = Arc::clone(&state);
            thread::spawn(move || accept_loop(listener, state))
        };

        Ok(Self {
            addr,
            state,
            acceptor: Some(acceptor),
        })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn host(&self) -> String {
        self.addr.ip().to_string()
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    /// Channel settings pointing at this store, with short timeouts.
    pub fn channel_config(&self) -> ChannelConfig {
        ChannelConfig::new(self.host(), self.port()).with_timeout(Some(Duration::from_secs(2)))
    }

    /// Enqueue a payload as another producer would (`LPUSH`).
    pub fn push_raw(&self, database: u32, queue: &str, payload: impl AsRef<[u8]>) {
        self.state
            .lists()
            .entry((database, queue.to_string()))
            .or_default()
            .push_front(Bytes::copy_from_slice(payload.as_ref()));
    }

    /// Queue contents, next to be popped first.
    pub fn contents(&self, database: u32, queue: &str) -> Vec<Bytes> {
        self.state
            .lists()
            .get(&(database, queue.to_string()))
            .map(|list| list.iter().rev().cloned().collect())
            .unwrap_or_default()
    }

    pub fn len(&self, database: u32, queue: &str) -> usize {
        self.state
            .lists()
            .get(&(database, queue.to_string()))
            .map_or(0, VecDeque::len)
    }

    /// Answer the next command, on any connection, with `-<message>`.
    pub fn fail_next(&self, message: &str) {
        *self
            .state
            .injected_error
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(message.to_string());
    }

    /// Close every open connection without touching stored data.
    ///
    /// Returns once all connection threads have exited.
    pub fn drop_connections(&self) {
        self.state.generation.fetch_add(1, Ordering::SeqCst);
        let deadline = Instant::now() + Duration::from_secs(5);
        while self.state.active.load(Ordering::SeqCst) > 0 && Instant::now() < deadline {
            thread::sleep(POLL_INTERVAL / 4);
        }
    }

    /// Connections accepted since start.
    pub fn connections_accepted(&self) -> usize {
        self.state.accepted.load(Ordering::SeqCst)
    }
}

impl Drop for MockStore {
    fn drop(&mut self) {
        self.state.shutdown.store(true, Ordering::SeqCst);
        self.drop_connections();
        if let Some(acceptor) = self.acceptor.take() {
            let _ = acceptor.join();
        }
    }
}

fn accept_loop(listener: TcpListener, state: Arc<State>) {
    while !state.shutdown.load(Ordering::SeqCst) {
        match listener.accept() {
            Ok((stream, _)) => {
                state.accepted.fetch_add(1, Ordering::SeqCst);
                state.active.fetch_add(1, Ordering::SeqCst);
                let state = Arc::clone(&state);
                thread::spawn(move || {
                    let _ = serve(stream, &state);
                    state.active.fetch_sub(1, Ordering::SeqCst);
                });
            }
            Err(err) if err.kind() == ErrorKind::WouldBlock => thread::sleep(POLL_INTERVAL),
            Err(_) => thread::sleep(POLL_INTERVAL),
        }
    }
}

fn serve(stream: TcpStream, state: &State) -> io::Result<()> {
    let generation = state.generation.load(Ordering::SeqCst);
    stream.set_nonblocking(false)?;
    stream.set_read_timeout(Some(POLL_INTERVAL))?;
    let mut reader = ReplyReader::new(stream.try_clone()?);
    let mut writer = CommandWriter::new(stream);
    let mut database = 0u32;

    loop {
        if state.generation.load(Ordering::SeqCst) != generation {
            return Ok(());
        }

        let request = match reader.read_reply() {
            Ok(request) => request,
            Err(RespError::Io(err))
                if matches!(err.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) =>
            {
                continue
            }
            Err(_) => return Ok(()),
        };

        let reply = match state.take_injected_error() {
            Some(message) => Reply::Error(message),
            None => execute(request, &mut database, state),
        };
        if writer.write_reply(&reply).is_err() {
            return Ok(());
        }
    }
}

fn execute(request: Reply, database: &mut u32, state: &State) -> Reply {
    let args = match request {
        Reply::Array(Some(items)) => {
            let args: Option<Vec<Bytes>> = items
                .into_iter()
                .map(|item| match item {
                    Reply::Bulk(Some(bytes)) => Some(bytes),
                    _ => None,
                })
                .collect();
            match args {
                Some(args) if !args.is_empty() => args,
                _ => return Reply::Error("ERR Protocol error: expected bulk strings".into()),
            }
        }
        _ => return Reply::Error("ERR Protocol error: expected array".into()),
    };

    let name = String::from_utf8_lossy(&args[0]).to_ascii_uppercase();
    let key = |index: usize| (*database, String::from_utf8_lossy(&args[index]).into_owned());

    match (name.as_str(), args.len()) {
        ("PING", 1) => Reply::Status("PONG".into()),
        ("SELECT", 2) => match std::str::from_utf8(&args[1]).ok().and_then(|s| s.parse().ok()) {
            Some(index) if index < DATABASES => {
                *database = index;
                Reply::Status("OK".into())
            }
            _ => Reply::Error("ERR DB index is out of range".into()),
        },
        ("LPUSH", n) if n >= 3 => {
            let mut lists = state.lists();
            let list = lists.entry(key(1)).or_default();
            for value in &args[2..] {
                list.push_front(value.clone());
            }
            Reply::Integer(list.len() as i64)
        }
        ("RPOP", 2) => {
            let mut lists = state.lists();
            let popped = lists.get_mut(&key(1)).and_then(VecDeque::pop_back);
            if lists.get(&key(1)).is_some_and(VecDeque::is_empty) {
                lists.remove(&key(1));
            }
            Reply::Bulk(popped)
        }
        ("LLEN", 2) => Reply::Integer(state.lists().get(&key(1)).map_or(0, VecDeque::len) as i64),
        ("DEL", n) if n >= 2 => {
            let mut lists = state.lists();
            let removed = (1..n).filter(|&i| lists.remove(&key(i)).is_some()).count();
            Reply::Integer(removed as i64)
        }
        ("PING" | "SELECT" | "LPUSH" | "RPOP" | "LLEN" | "DEL", _) => Reply::Error(format!(
            "ERR wrong number of arguments for '{}' command",
            name.to_ascii_lowercase()
        )),
        _ => Reply::Error(format!(
            "ERR unknown command '{}'",
            String::from_utf8_lossy(&args[0])
        )),
    }
}
