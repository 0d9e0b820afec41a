//! Service advertisement so sensor sources can locate the bridge.

use bridge_traits::{Discovery, ServiceAdvert};
use std::net::{IpAddr, Ipv4Addr, UdpSocket};

/// LAN address of this host, or loopback when it cannot be determined.
///
/// Connecting a UDP socket sends nothing; it only asks the OS which local
/// interface would route to a public address.
pub fn local_ip() -> IpAddr {
    let probe = || -> std::io::Result<IpAddr> {
        let s = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0))?;
        s.connect(("8.8.8.8", 80))?;
        Ok(s.local_addr()?.ip())
    };
    probe().unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST))
}

/// Discovery stand-in that only logs; used without the `mdns` feature or
/// when discovery is disabled.
#[derive(Debug, Default)]
pub struct LoggingDiscovery {
    registered: Option<ServiceAdvert>,
}

impl LoggingDiscovery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn registered(&self) -> Option<&ServiceAdvert> {
        self.registered.as_ref()
    }
}

impl Discovery for LoggingDiscovery {
    fn register(
        &mut self,
        advert: &ServiceAdvert,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        tracing::info!(
            service = %advert.service_type,
            instance = %advert.instance_name,
            address = %advert.address,
            port = advert.port,
            "service advertisement (not broadcast)"
        );
        self.registered = Some(advert.clone());
        Ok(())
    }

    fn unregister(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        if let Some(advert) = self.registered.take() {
            tracing::info!(instance = %advert.instance_name, "service advertisement withdrawn");
        }
        Ok(())
    }
}

#[cfg(feature = "mdns")]
pub use mdns::MdnsDiscovery;

#[cfg(feature = "mdns")]
mod mdns {
    use super::*;
    use crate::error::HwError;
    use mdns_sd::{ServiceDaemon, ServiceInfo};
    use std::collections::HashMap;
    use std::time::Duration;

    const UNREGISTER_WAIT: Duration = Duration::from_secs(1);

    /// mDNS/DNS-SD advertisement backed by `mdns-sd`.
    #[derive(Default)]
    pub struct MdnsDiscovery {
        daemon: Option<ServiceDaemon>,
        fullname: Option<String>,
    }

    impl MdnsDiscovery {
        pub fn new() -> Self {
            Self::default()
        }
    }

    impl Discovery for MdnsDiscovery {
        fn register(
            &mut self,
            advert: &ServiceAdvert,
        ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
            let daemon = ServiceDaemon::new().map_err(|e| HwError::Discovery(e.to_string()))?;
            let host = format!("{}.local.", advert.instance_name);
            let props: HashMap<String, String> = advert.metadata.iter().cloned().collect();
            let info = ServiceInfo::new(
                &advert.service_type,
                &advert.instance_name,
                &host,
                advert.address,
                advert.port,
                props,
            )
            .map_err(|e| HwError::Discovery(e.to_string()))?;
            let fullname = info.get_fullname().to_string();
            daemon
                .register(info)
                .map_err(|e| HwError::Discovery(e.to_string()))?;
            tracing::info!(service = %fullname, address = %advert.address, "mDNS service registered");
            self.daemon = Some(daemon);
            self.fullname = Some(fullname);
            Ok(())
        }

        fn unregister(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
            let (Some(daemon), Some(fullname)) = (self.daemon.take(), self.fullname.take())
            else {
                return Ok(());
            };
            let rx = daemon
                .unregister(&fullname)
                .map_err(|e| HwError::Discovery(e.to_string()))?;
            if rx.recv_timeout(UNREGISTER_WAIT).is_err() {
                tracing::warn!(service = %fullname, "mDNS unregister not confirmed");
            }
            let _ = daemon.shutdown();
            tracing::info!(service = %fullname, "mDNS service unregistered");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn logging_discovery_tracks_registration() {
        let mut d = LoggingDiscovery::new();
        let advert = ServiceAdvert {
            service_type: "_midi._tcp.local.".into(),
            instance_name: "MIDISensorController".into(),
            address: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 8081,
            metadata: vec![("description".into(), "MIDI Sensor Controller".into())],
        };
        d.register(&advert).unwrap();
        assert_eq!(d.registered(), Some(&advert));
        d.unregister().unwrap();
        assert!(d.registered().is_none());
        // Second unregister is a no-op.
        d.unregister().unwrap();
    }
}
