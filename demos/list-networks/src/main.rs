//! Connects to the first provisioning-capable peripheral it finds and
//! prints the device's saved networks and scan results.
//!
//! ```text
//! RUST_LOG=bleprov=debug cargo run -p list-networks -- --max-networks 16
//! ```

use clap::Parser;
use tracing_subscriber::EnvFilter;

use bleprov::{
    ListNetworkRequest, Provisioner, ProvisionerEvent, SecurityType,
};
use bleprov_protocol::{CborCodec, NETWORK_CONFIG_SERVICE};
use bleprov_transport::BtleplugCentral;

#[derive(Parser, Debug)]
#[command(about = "List wifi networks on a BLE provisioning peripheral")]
struct Args {
    /// Cap on the number of scan results the device reports.
    #[arg(long, default_value_t = 16)]
    max_networks: i32,

    /// Device-side scan timeout in seconds.
    #[arg(long, default_value_t = 5)]
    timeout_secs: i32,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let (central, mut transport_events) = BtleplugCentral::new().await?;
    let (mut provisioner, mut events) = Provisioner::new(central, CborCodec);

    tracing::info!("scanning for peripherals");
    provisioner.start_scan()?;

    let mut target = None;
    loop {
        tokio::select! {
            Some(event) = transport_events.recv() => {
                provisioner.handle_event(event);
            }
            Some(event) = events.recv() => {
                match event {
                    ProvisionerEvent::PeripheralDiscovered(device)
                        if target.is_none() =>
                    {
                        tracing::info!(%device, "connecting");
                        target = Some(device);
                        provisioner.stop_scan()?;
                        provisioner.connect(device)?;
                    }
                    ProvisionerEvent::CharacteristicsDiscovered {
                        device,
                        service,
                    } if service == NETWORK_CONFIG_SERVICE => {
                        provisioner.list_networks(
                            device,
                            ListNetworkRequest {
                                max_networks: args.max_networks,
                                timeout_secs: args.timeout_secs,
                            },
                        )?;
                    }
                    ProvisionerEvent::NetworkListed { record, .. } => {
                        let kind = if record.is_scan_result() {
                            "scanned".to_string()
                        } else {
                            format!("saved #{}", record.index)
                        };
                        println!(
                            "{kind:>10}  {:<32}  {:>4} dBm  {}{}",
                            record.ssid,
                            record.rssi,
                            security_label(record.security),
                            if record.connected { "  (connected)" } else { "" },
                        );
                    }
                    ProvisionerEvent::PeripheralConnectFailed(device) => {
                        tracing::error!(%device, "connect failed");
                        break;
                    }
                    ProvisionerEvent::PeripheralDisconnected {
                        device,
                        cause,
                    } => {
                        tracing::info!(%device, ?cause, "disconnected");
                        break;
                    }
                    _ => {}
                }
            }
            else => break,
        }
    }

    Ok(())
}

fn security_label(security: SecurityType) -> &'static str {
    match security {
        SecurityType::Open => "open",
        SecurityType::Wep => "wep",
        SecurityType::Wpa => "wpa",
        SecurityType::Wpa2 => "wpa2",
        SecurityType::NotSupported => "?",
    }
}
