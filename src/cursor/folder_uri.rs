//! Decoding of workspace folder URIs stored in workspace.json
//!
//! Cursor records each workspace as either a `file://` URL (local project)
//! or a `vscode-remote://` URL whose authority names the remote kind and host.

use percent_encoding::percent_decode_str;
use serde::Serialize;
use std::fmt;
use url::Url;

/// Remote connection type for vscode-remote:// URLs
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RemoteType {
    Tunnel,
    SshRemote,
    DevContainer,
    Wsl,
    Unknown(String),
}

impl RemoteType {
    fn parse(s: &str) -> Self {
        match s {
            "tunnel" => Self::Tunnel,
            "ssh-remote" => Self::SshRemote,
            "dev-container" => Self::DevContainer,
            "wsl" => Self::Wsl,
            other => Self::Unknown(other.to_string()),
        }
    }
}

impl fmt::Display for RemoteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tunnel => write!(f, "tunnel"),
            Self::SshRemote => write!(f, "ssh"),
            Self::DevContainer => write!(f, "container"),
            Self::Wsl => write!(f, "wsl"),
            Self::Unknown(s) => write!(f, "{}", s),
        }
    }
}

/// Where a workspace's project folder lives
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FolderLocation {
    /// Decoded path (local or on the remote)
    pub path: String,
    /// Remote kind, `None` for local folders
    pub remote: Option<RemoteType>,
    /// Remote host or name
    pub host: Option<String>,
}

impl fmt::Display for FolderLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.remote, &self.host) {
            (Some(remote), Some(host)) => write!(f, "[{}:{}] {}", remote, host, self.path),
            (Some(remote), None) => write!(f, "[{}] {}", remote, self.path),
            _ => write!(f, "{}", self.path),
        }
    }
}

/// Decode a `file://` or `vscode-remote://` URL
///
/// Returns `None` for any other scheme or an unparseable string.
pub fn parse_folder_uri(uri: &str) -> Option<FolderLocation> {
    let url = Url::parse(uri).ok()?;

    match url.scheme() {
        "file" => {
            let path = url
                .to_file_path()
                .map(|p| p.to_string_lossy().to_string())
                .unwrap_or_else(|_| decode(url.path()));
            Some(FolderLocation {
                path,
                remote: None,
                host: None,
            })
        }
        "vscode-remote" => {
            // vscode-remote://[type]+[name]/path
            // Dev containers on a remote: dev-container+{config}@ssh-remote+host/path
            let username = decode(url.username());
            let host = decode(url.host_str()?);

            let (remote, name) = if username.starts_with("dev-container+") {
                let name = host.split('+').nth(1).unwrap_or("container").to_string();
                (RemoteType::DevContainer, Some(name))
            } else if let Some((kind, name)) = host.split_once('+') {
                (RemoteType::parse(kind), Some(name.to_string()))
            } else {
                (RemoteType::Unknown(host.clone()), None)
            };

            Some(FolderLocation {
                path: decode(url.path()),
                remote: Some(remote),
                host: name,
            })
        }
        _ => None,
    }
}

fn decode(s: &str) -> String {
    percent_decode_str(s).decode_utf8_lossy().into_owned()
}
