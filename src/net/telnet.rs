pub mod protocol;

use crate::Registry;
use crate::error::{AppResult, InfraError};
use crate::net::output::{OutputHandle, SessionOut};
use crate::net::sink::telnet::TelnetSink;
use crate::net::telnet::protocol::{LineBuffer, TelnetIn, TelnetMachine};
use crate::net::{ClientEnd, InputEvent, channel_pair};
use crate::state::machine;
use crate::state::session::Session;
use bytes::BytesMut;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::AsyncReadExt;
use tokio::net::tcp::OwnedReadHalf;
use tokio::sync::mpsc;

/// Run the telnet server
pub async fn serve(addr: SocketAddr, registry: Arc<Registry>) -> AppResult<()> {
    let listener = tokio::net::TcpListener::bind(&addr).await.map_err(InfraError::from)?;
    tracing::info!(%addr, "telnet listening");

    loop {
        match listener.accept().await {
            Ok((stream, peer)) => {
                tracing::info!(%peer, "client connected");

                let registry = registry.clone();
                tokio::spawn(async move {
                    if let Err(e) = handle_connection(stream, peer, registry).await {
                        tracing::error!(%peer, error = %e, "connection error");
                    }
                    tracing::info!(%peer, "client disconnected");
                });
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to accept connection");
                tokio::time::sleep(std::time::Duration::from_millis(200)).await;
            }
        }
    }
}

async fn handle_connection(stream: tokio::net::TcpStream, peer: SocketAddr, registry: Arc<Registry>) -> AppResult<()> {
    let _ = stream.set_nodelay(true);
    let (read_half, mut write_half) = stream.into_split();

    let mut telnet = TelnetMachine::new();
    telnet.start_negotiation(&mut write_half).await.map_err(InfraError::from)?;

    let (io, client) = channel_pair();
    let ClientEnd {
        input: input_tx,
        output: output_rx,
    } = client;

    let writer = tokio::spawn(async move {
        if let Err(e) = SessionOut::new(output_rx).run(TelnetSink::new(write_half)).await {
            tracing::debug!(%peer, error = %e, "output closed");
        }
    });

    let reader_output = io.output.clone();
    let reader = tokio::spawn(async move {
        if let Err(e) = read_loop(read_half, telnet, input_tx, reader_output).await {
            tracing::debug!(%peer, error = %e, "input closed");
        }
    });

    let session = Session::new(registry, io, peer.to_string());
    machine::run(session).await;

    // the session is over; stop reading and let the writer drain
    reader.abort();
    let _ = writer.await;

    Ok(())
}

/// Decode telnet bytes into input events until the client goes away.
async fn read_loop(
    mut reader: OwnedReadHalf,
    mut telnet: TelnetMachine,
    input: mpsc::Sender<InputEvent>,
    output: OutputHandle,
) -> std::io::Result<()> {
    let mut lines = LineBuffer::new();
    let mut buf = BytesMut::with_capacity(512);

    loop {
        buf.clear();
        let n = reader.read_buf(&mut buf).await?;
        if n == 0 {
            return Ok(()); // disconnect; dropping `input` tells the session
        }

        for &b in buf.iter() {
            let response = telnet.push(b);

            if let Some(bytes) = response.response {
                output.raw(bytes).await;
            }

            let event = match response.event {
                Some(TelnetIn::Data(b)) => lines.push(b).map(InputEvent::Line),
                Some(TelnetIn::Naws { cols, rows }) => Some(InputEvent::Resize { cols, rows }),
                None => None,
            };

            if let Some(event) = event {
                if input.send(event).await.is_err() {
                    return Ok(());
                }
            }
        }
    }
}
