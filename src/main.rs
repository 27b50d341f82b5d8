#[macro_use]
extern crate log;

mod buffer;
mod config;
mod processor;
mod protocol;
mod system;
mod table;

use std::str::FromStr;
use std::sync::Arc;

use log::LevelFilter;
use simple_logger::SimpleLogger;
use tokio::net::UdpSocket;

use crate::buffer::{PacketBuffer, MAX_PACK_LEN};
use crate::protocol::HEADER_LEN;
use crate::system::Result;
use crate::table::RecordTable;

//dig @127.0.0.1 -p 53 foo.example.com
//dig @127.0.0.1 -p 53 -x 10.0.0.1
#[tokio::main]
async fn main() -> Result<()> {
    let config_path = std::env::args().nth(1).unwrap_or("staticdns.toml".to_string());
    let config = config::init_from_toml(&config_path).await?;
    SimpleLogger::new()
        .with_level(LevelFilter::from_str(&config.log_level)?)
        .init()?;
    let pairs = config::read_record_pairs(&config.records_file).await?;
    let table = Arc::new(RecordTable::from_pairs(pairs));
    info!("loaded {} records from {}", table.len(), config.records_file);
    let socket = Arc::new(UdpSocket::bind(("0.0.0.0", config.port)).await?);
    info!("accepting UDP packets on {}", socket.local_addr()?);
    loop {
        let mut buffer = PacketBuffer::new();
        let (len, src) = socket.recv_from(buffer.as_recv_slice()).await?;
        if len < HEADER_LEN || len > MAX_PACK_LEN {
            info!("packet size {}, ignored", len);
            continue;
        }
        let socket = socket.clone();
        let table = table.clone();
        let ttl = config.ttl;
        tokio::spawn(async move {
            if let Some(reply_len) = processor::process_packet(&table, ttl, &mut buffer, len) {
                if let Err(e) = socket.send_to(buffer.slice(0, reply_len), src).await {
                    error!("error occur here send {:?}", e);
                }
            }
        });
    }
}
