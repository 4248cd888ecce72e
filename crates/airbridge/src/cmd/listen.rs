use std::io::ErrorKind;
use std::net::{SocketAddr, UdpSocket};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use airbridge_bus::MemoryBus;
use airbridge_node::{Bridge, BridgeConfig, NodeIdentity, SinkRef, TagConflict};
use airbridge_wire::{encode_publish_frame, TypeTag};

use crate::cmd::ListenArgs;
use crate::exit::{io_error, CliError, CliResult, SUCCESS};

const RECV_BUFFER_SIZE: usize = 2048;
const POLL_INTERVAL: Duration = Duration::from_millis(200);

pub fn run(args: ListenArgs) -> CliResult<i32> {
    let socket = UdpSocket::bind(&args.bind).map_err(|err| io_error("bind failed", err))?;
    socket
        .set_read_timeout(Some(POLL_INTERVAL))
        .map_err(|err| io_error("socket setup failed", err))?;
    let socket = Arc::new(socket);

    // Forwarded data goes back to whichever peer spoke last.
    let peer_addr: Arc<Mutex<Option<SocketAddr>>> = Arc::new(Mutex::new(None));

    let sink = {
        let socket = Arc::clone(&socket);
        let peer_addr = Arc::clone(&peer_addr);
        move |_node: &NodeIdentity, topic: &str, tag: TypeTag, data: &str| {
            let Some(addr) = *lock(&peer_addr) else {
                tracing::warn!(topic, "no peer yet, dropping forwarded data");
                return;
            };
            match encode_publish_frame(topic, tag, data) {
                Ok(frame) => {
                    let message = format!("{}{frame}", airbridge_node::FLAG_PUBLISH);
                    if let Err(err) = socket.send_to(message.as_bytes(), addr) {
                        tracing::warn!(topic, %err, "forward send failed");
                    }
                }
                Err(err) => tracing::warn!(topic, %err, "unforwardable topic"),
            }
        }
    };
    let sink_ref: SinkRef = Arc::new(sink);

    let config = BridgeConfig {
        buffer_depth: args.buffer_depth,
        tag_conflict: if args.reject_tag_conflicts {
            TagConflict::Reject
        } else {
            TagConflict::KeepFirst
        },
    };
    let mut bridge = Bridge::new(
        NodeIdentity::new(args.bind.clone(), args.node_name.clone()),
        config,
        MemoryBus::new(),
        sink_ref,
    );

    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    tracing::info!(bind = %args.bind, node = %args.node_name, "bridge listening");

    let mut buf = [0u8; RECV_BUFFER_SIZE];
    let mut handled = 0usize;

    while running.load(Ordering::SeqCst) {
        let (len, from) = match socket.recv_from(&mut buf) {
            Ok(received) => received,
            Err(err)
                if err.kind() == ErrorKind::WouldBlock || err.kind() == ErrorKind::TimedOut =>
            {
                continue;
            }
            Err(err) => return Err(io_error("receive failed", err)),
        };

        *lock(&peer_addr) = Some(from);
        let raw = String::from_utf8_lossy(&buf[..len]);
        if let Err(err) = bridge.handle_message(&raw) {
            tracing::warn!(%from, %err, "dropped message");
        }
        bridge.bus_mut().pump();

        handled = handled.saturating_add(1);
        if let Some(count) = args.count {
            if handled >= count {
                break;
            }
        }
    }

    tracing::info!(
        handled,
        subscriptions = bridge.registry().subscription_count(),
        publishers = bridge.registry().publisher_count(),
        "bridge stopped"
    );
    Ok(SUCCESS)
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn install_ctrlc_handler(running: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .map_err(|err| {
        CliError::new(
            crate::exit::INTERNAL,
            format!("signal handler setup failed: {err}"),
        )
    })
}
