//! Online/offline tracking.

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

/// Whether the remote API is believed reachable
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Connectivity {
    Offline,
    Online,
}

impl Connectivity {
    pub const fn from_online(online: bool) -> Self {
        if online {
            Self::Online
        } else {
            Self::Offline
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Offline => "offline",
            Self::Online => "online",
        }
    }
}

/// Edge observed by [`ConnectivityMonitor::set_status`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
    WentOnline,
    WentOffline,
}

/// Current connectivity flag plus a channel for observers.
///
/// There is no periodic probe: the status only changes when a platform
/// signal is fed in through `set_status`.
pub struct ConnectivityMonitor {
    tx: watch::Sender<Connectivity>,
}

impl ConnectivityMonitor {
    pub fn new(initial: Connectivity) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx }
    }

    pub fn status(&self) -> Connectivity {
        *self.tx.borrow()
    }

    pub fn is_online(&self) -> bool {
        self.status() == Connectivity::Online
    }

    /// Record a platform signal and report the edge, if any.
    pub fn set_status(&self, status: Connectivity) -> Option<Transition> {
        let previous = self.tx.send_replace(status);
        match (previous, status) {
            (Connectivity::Offline, Connectivity::Online) => {
                tracing::info!("Connectivity restored");
                Some(Transition::WentOnline)
            }
            (Connectivity::Online, Connectivity::Offline) => {
                tracing::info!("Connectivity lost; writes will be queued");
                Some(Transition::WentOffline)
            }
            _ => None,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<Connectivity> {
        self.tx.subscribe()
    }
}
