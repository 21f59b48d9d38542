use log::{ info, warn };
use std::net::{ IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr };
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::task::JoinHandle;

/// URL a local browser should use for a server bound to `addr`.
/// Wildcard binds are reached through loopback.
pub fn ui_url(addr: SocketAddr) -> String {
    let ip = match addr.ip() {
        IpAddr::V4(ip) if ip.is_unspecified() => IpAddr::V4(Ipv4Addr::LOCALHOST),
        IpAddr::V6(ip) if ip.is_unspecified() => IpAddr::V6(Ipv6Addr::LOCALHOST),
        ip => ip,
    };
    format!("http://{}", SocketAddr::new(ip, addr.port()))
}

/// The platform command that hands a URL to the default browser.
pub fn opener_command(url: &str) -> (&'static str, Vec<String>) {
    if cfg!(windows) {
        // The empty string is the window title `start` expects before the target.
        ("cmd", vec!["/C".into(), "start".into(), "".into(), url.to_string()])
    } else if cfg!(target_os = "macos") {
        ("open", vec![url.to_string()])
    } else {
        ("xdg-open", vec![url.to_string()])
    }
}

/// Opens `url` in the default browser after `delay`, in the background.
pub fn open_after(url: String, delay: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        let (program, args) = opener_command(&url);
        info!("Opening {} in the browser", url);

        let res = Command::new(program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status().await;

        match res {
            Ok(status) if status.success() => {}
            Ok(status) => warn!("{} exited with {}, open {} manually", program, status, url),
            Err(e) => warn!("Could not launch {}: {}. Open {} manually", program, e, url),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ui_url_uses_bound_address() {
        assert_eq!(ui_url("127.0.0.1:5000".parse().unwrap()), "http://127.0.0.1:5000");
    }

    #[test]
    fn ui_url_maps_wildcard_to_loopback() {
        assert_eq!(ui_url("0.0.0.0:8080".parse().unwrap()), "http://127.0.0.1:8080");
        assert_eq!(ui_url("[::]:8080".parse().unwrap()), "http://[::1]:8080");
    }

    #[test]
    fn opener_passes_url_last() {
        let (_, args) = opener_command("http://127.0.0.1:5000");
        assert_eq!(args.last().map(String::as_str), Some("http://127.0.0.1:5000"));
    }
}
