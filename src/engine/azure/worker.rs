use super::protocol::{self, SAMPLE_RATE};
use crate::audio::{to_mono, AudioFrame, LinearResampler, MicrophoneCapture};
use crate::engine::RecognitionListener;
use anyhow::{Context, Result};
use std::net::{TcpStream, ToSocketAddrs};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, warn};
use tungstenite::client::IntoClientRequest;
use tungstenite::stream::MaybeTlsStream;
use tungstenite::{Message, WebSocket};

type Socket = WebSocket<MaybeTlsStream<TcpStream>>;

/// Audio is batched and sent at this cadence
const SEND_INTERVAL: Duration = Duration::from_millis(100);
/// Read timeout in the main loop; also bounds how quickly a stop is noticed
const READ_TICK: Duration = Duration::from_millis(50);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(30);

pub(super) struct WorkerJob {
    pub url: url::Url,
    pub key: String,
    pub listener: Arc<dyn RecognitionListener>,
    pub stop_signal: Arc<AtomicBool>,
    pub ready: Option<oneshot::Sender<Result<()>>>,
}

/// Thread body: arm the connection and microphone, report readiness, then stream
/// until the stop signal is raised.
pub(super) fn run(mut job: WorkerJob) {
    let ready = job.ready.take();

    let armed = connect(&job.url, &job.key).and_then(|mut socket| {
        let (mic, frames) = MicrophoneCapture::open_default()?;
        socket_set_read_timeout(&mut socket, Some(READ_TICK))?;
        Ok((socket, mic, frames))
    });

    let (socket, mic, frames) = match armed {
        Ok(parts) => parts,
        Err(e) => {
            error!("Failed to arm speech translation: {:#}", e);
            if let Some(ready) = ready {
                let _ = ready.send(Err(e));
            }
            return;
        }
    };

    if let Some(ready) = ready {
        if ready.send(Ok(())).is_err() {
            warn!("Start request went away before the engine was ready, shutting down");
            return;
        }
    }

    info!("Speech worker streaming from '{}'", mic.device_name());

    if let Err(e) = stream(&job, socket, &mic, frames) {
        error!("Speech translation ended abnormally: {:#}", e);
        job.listener.canceled(&format!("{:#}", e));
    }

    mic.stop();
    info!("Speech worker stopped");
}

/// Open the websocket and send `speech.config`
fn connect(url: &url::Url, key: &str) -> Result<Socket> {
    let host = url
        .host_str()
        .ok_or_else(|| anyhow::anyhow!("No host in URL"))?;
    let port = url
        .port_or_known_default()
        .ok_or_else(|| anyhow::anyhow!("No port for scheme {}", url.scheme()))?;

    let addr = (host, port)
        .to_socket_addrs()?
        .next()
        .ok_or_else(|| anyhow::anyhow!("Failed to resolve hostname: {}", host))?;

    debug!("Connecting to {} ({})", host, addr);

    let tcp_stream = TcpStream::connect_timeout(&addr, CONNECT_TIMEOUT)
        .with_context(|| format!("Failed to connect to {}", host))?;
    tcp_stream.set_read_timeout(Some(HANDSHAKE_TIMEOUT))?;
    tcp_stream.set_write_timeout(Some(HANDSHAKE_TIMEOUT))?;
    tcp_stream.set_nodelay(true)?;

    let stream = if url.scheme() == "wss" {
        let connector = native_tls::TlsConnector::new()?;
        let tls_stream = connector
            .connect(host, tcp_stream)
            .context("TLS handshake failed")?;
        MaybeTlsStream::NativeTls(tls_stream)
    } else {
        MaybeTlsStream::Plain(tcp_stream)
    };

    let connection_id = protocol::new_request_id();
    let mut request = url.as_str().into_client_request()?;
    let headers = request.headers_mut();
    headers.insert("Ocp-Apim-Subscription-Key", key.parse()?);
    headers.insert("X-ConnectionId", connection_id.parse()?);

    let (mut socket, _response) = tungstenite::client::client(request, stream)
        .map_err(|e| anyhow::anyhow!("Websocket handshake failed: {}", e))?;

    socket.send(Message::text(protocol::encode_text_message(
        protocol::PATH_SPEECH_CONFIG,
        &connection_id,
        "application/json",
        &protocol::speech_config_body(),
    )))?;

    info!("Connected to speech service (connection {})", connection_id);
    Ok(socket)
}

fn socket_set_read_timeout(socket: &mut Socket, timeout: Option<Duration>) -> Result<()> {
    match socket.get_mut() {
        MaybeTlsStream::Plain(stream) => stream.set_read_timeout(timeout)?,
        MaybeTlsStream::NativeTls(stream) => stream.get_mut().set_read_timeout(timeout)?,
        _ => {}
    }
    Ok(())
}

/// One recognition turn: the service ends a turn with `turn.end`, after which audio
/// continues under a new request id with a fresh WAV header.
struct Turn {
    request_id: String,
    header_sent: bool,
}

impl Turn {
    fn new() -> Self {
        Self {
            request_id: protocol::new_request_id(),
            header_sent: false,
        }
    }
}

fn stream(
    job: &WorkerJob,
    mut socket: Socket,
    mic: &MicrophoneCapture,
    mut frames: mpsc::Receiver<AudioFrame>,
) -> Result<()> {
    let wav_header = protocol::wav_header()?;
    let mut turn = Turn::new();
    let mut pending: Vec<i16> = Vec::new();
    let mut resampler: Option<LinearResampler> = None;
    let mut last_send = Instant::now();

    while !job.stop_signal.load(Ordering::SeqCst) {
        while let Ok(frame) = frames.try_recv() {
            let mono = to_mono(&frame.samples, frame.channels);
            // One resampler per device rate so interpolation carries across buffers
            let mut current = match resampler.take() {
                Some(r) if r.from_rate() == frame.sample_rate => r,
                _ => LinearResampler::new(frame.sample_rate, SAMPLE_RATE),
            };
            pending.extend(current.process(&mono));
            resampler = Some(current);
        }

        if last_send.elapsed() >= SEND_INTERVAL && !pending.is_empty() {
            if !turn.header_sent {
                socket.send(Message::binary(protocol::encode_audio_message(
                    &turn.request_id,
                    &wav_header,
                )))?;
                turn.header_sent = true;
            }

            let payload = protocol::pcm_bytes(&pending);
            socket.send(Message::binary(protocol::encode_audio_message(
                &turn.request_id,
                &payload,
            )))?;
            pending.clear();
            last_send = Instant::now();
        }

        match socket.read() {
            Ok(Message::Text(text)) => {
                if dispatch(text.as_str(), job.listener.as_ref()) {
                    debug!("Turn {} ended", turn.request_id);
                    turn = Turn::new();
                }
            }
            Ok(Message::Close(frame)) => {
                let reason = frame
                    .map(|f| format!("code={}, reason={}", f.code, f.reason))
                    .unwrap_or_else(|| "no frame".to_string());
                anyhow::bail!("Connection closed by service: {}", reason);
            }
            Ok(_) => {}
            Err(tungstenite::Error::Io(ref e))
                if e.kind() == std::io::ErrorKind::WouldBlock
                    || e.kind() == std::io::ErrorKind::TimedOut => {}
            Err(e) => return Err(e).context("Websocket read failed"),
        }
    }

    mic.stop();

    // Empty audio message tells the service no more audio is coming
    let end_of_audio = protocol::encode_audio_message(&turn.request_id, &[]);
    if let Err(e) = socket.send(Message::binary(end_of_audio)) {
        debug!("Failed to send end-of-audio: {}", e);
    }
    if let Err(e) = socket.close(None) {
        debug!("Failed to close websocket: {}", e);
    }

    Ok(())
}

/// Route one service message to the listener. Returns true on `turn.end`.
fn dispatch(raw: &str, listener: &dyn RecognitionListener) -> bool {
    let Some(msg) = protocol::parse_text_message(raw) else {
        warn!("Ignoring service message without a Path header");
        return false;
    };

    match msg.path.as_str() {
        protocol::PATH_HYPOTHESIS => match protocol::parse_hypothesis(msg.body) {
            Ok(result) => listener.recognizing(&result),
            Err(e) => warn!("{:#}", e),
        },
        protocol::PATH_PHRASE => match protocol::parse_phrase(msg.body) {
            Ok(result) => listener.recognized(&result),
            Err(e) => warn!("{:#}", e),
        },
        protocol::PATH_TURN_END => return true,
        other => debug!("Service message: {}", other),
    }

    false
}
