use farm_container::{ContainerError, InterfaceRequest, Provisioner};
use farm_guest::AlpinePersona;
use farm_runtime::testing::FakeLxc;
use farm_runtime::{
    InterfaceAddress, InterfaceKind, LxcBackend, LxcConfig, RootfsKind, RuntimeError, State,
};
use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

struct Fixture {
    dir: TempDir,
    lxc: Arc<FakeLxc>,
    provisioner: Arc<Provisioner>,
}

impl Fixture {
    fn new() -> Self {
        Self::with_lxc(FakeLxc::new())
    }

    fn with_lxc(lxc: FakeLxc) -> Self {
        let dir = TempDir::new().unwrap();
        let lxc = Arc::new(lxc);
        let config = LxcConfig::default().with_lxc_path(dir.path());
        let backend = Arc::new(LxcBackend::new(lxc.clone(), config.clone()));
        let provisioner = Arc::new(Provisioner::new(
            backend,
            Arc::new(AlpinePersona::default()),
            &config,
        ));
        Self {
            dir,
            lxc,
            provisioner,
        }
    }

    fn read(&self, relative: &str) -> String {
        std::fs::read_to_string(self.dir.path().join(relative)).unwrap()
    }

    fn root(&self) -> String {
        self.dir.path().display().to_string()
    }
}

fn addr(s: &str) -> InterfaceAddress {
    s.parse().unwrap()
}

#[tokio::test]
async fn test_create_web1_from_scratch() {
    let fx = Fixture::new();

    let mut web1 = fx.provisioner.container("web1").await.unwrap();

    assert_eq!(fx.lxc.count("lxc-create"), 1);
    assert_eq!(fx.lxc.count("lxc-copy"), 1);
    let copy = fx.lxc.calls_for("lxc-copy").remove(0);
    assert_eq!(copy.flag_value("-n"), Some("base"));
    assert_eq!(copy.flag_value("-N"), Some("web1"));

    assert!(web1.is_cloned());
    assert_eq!(web1.rootfs_kind(), RootfsKind::Overlay);
    assert!(web1.interfaces().is_empty());
    assert_eq!(web1.state().await.unwrap(), State::Stopped);

    let config = fx.read("web1/config");
    assert!(config.starts_with(
        "# general\nlxc.include = /usr/share/lxc/config/nesting.conf\nlxc.arch = linux64\n"
    ));
    assert!(config.contains(&format!(
        "lxc.rootfs.path = overlay:{root}/base/rootfs:{root}/web1/overlay/delta\n",
        root = fx.root()
    )));

    let eth1 = web1
        .add_interface(InterfaceRequest::internal(addr("10.0.2.5")))
        .await
        .unwrap();
    assert_eq!(eth1.name, "eth1");
    assert_eq!(eth1.link, "lxcbr0");
    assert_eq!(eth1.gateway, None);

    let eth2 = web1
        .add_interface(InterfaceRequest::external(addr("203.0.113.9"), "eth0"))
        .await
        .unwrap();
    assert_eq!(eth2.name, "eth2");
    assert_eq!(eth2.gateway, Some(Ipv4Addr::new(203, 0, 113, 1)));

    let config = fx.read("web1/config");
    assert!(!config.contains("lxc.net.1.ipv4.gateway"));
    assert!(config.contains("lxc.net.2.ipv4.gateway = 203.0.113.1\n"));
    assert!(config.contains("lxc.net.2.type = phys\n"));

    let guest = fx.read("web1/overlay/delta/etc/network/interfaces");
    assert_eq!(
        guest,
        "hostname $(hostname)\n\nauto lo\niface lo inet loopback\n\
         \nauto eth1\niface eth1 inet manual\n\
         \nauto eth2\niface eth2 inet manual\n"
    );

    assert_eq!(web1.ip().unwrap(), addr("10.0.2.5"));
}

#[tokio::test]
async fn test_base_is_reused_for_later_containers() {
    let fx = Fixture::new();

    fx.provisioner.container("web1").await.unwrap();
    fx.provisioner.container("web2").await.unwrap();

    assert_eq!(fx.lxc.count("lxc-create"), 1);
    assert_eq!(fx.lxc.count("lxc-copy"), 2);

    let base = fx.provisioner.base().await.unwrap();
    assert!(!base.is_cloned());
    assert_eq!(base.rootfs_kind(), RootfsKind::Dir);
    assert!(fx.read("base/config").contains(&format!(
        "lxc.rootfs.path = dir:{}/base/rootfs\n",
        fx.root()
    )));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_creation_bootstraps_base_once() {
    let fx = Fixture::with_lxc(FakeLxc::new().with_create_delay(Duration::from_millis(50)));

    let handles: Vec<_> = ["web1", "web2", "web3", "web4"]
        .into_iter()
        .map(|name| {
            let provisioner = fx.provisioner.clone();
            tokio::spawn(async move { provisioner.container(name).await.map(|c| c.is_cloned()) })
        })
        .collect();

    for handle in handles {
        assert!(handle.await.unwrap().unwrap());
    }

    assert_eq!(fx.lxc.count("lxc-create"), 1);
    assert_eq!(fx.lxc.count("lxc-copy"), 4);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_requests_for_same_name_clone_once() {
    let fx = Fixture::new();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let provisioner = fx.provisioner.clone();
            tokio::spawn(async move { provisioner.container("web1").await.map(|_| ()) })
        })
        .collect();

    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert_eq!(fx.lxc.count("lxc-copy"), 1);
}

#[tokio::test]
async fn test_reattach_reconciles_interfaces() {
    let fx = Fixture::new();

    {
        let mut web1 = fx.provisioner.container("web1").await.unwrap();
        web1.add_interface(InterfaceRequest::internal(addr("10.0.2.5")))
            .await
            .unwrap();
    }

    let mut again = fx.provisioner.container("web1").await.unwrap();
    assert_eq!(fx.lxc.count("lxc-copy"), 1);
    assert!(again.is_cloned());
    assert_eq!(again.interfaces().len(), 1);
    assert_eq!(again.interfaces()[0].kind, InterfaceKind::Internal);
    assert_eq!(again.ip().unwrap(), addr("10.0.2.5"));

    let next = again
        .add_interface(InterfaceRequest::external(addr("203.0.113.9"), "eth0"))
        .await
        .unwrap();
    assert_eq!(next.id, 2);
}

#[tokio::test]
async fn test_two_handles_share_interface_numbering() {
    let fx = Fixture::new();

    let mut first = fx.provisioner.container("web1").await.unwrap();
    let mut second = fx.provisioner.container("web1").await.unwrap();

    let a = first
        .add_interface(InterfaceRequest::internal(addr("10.0.2.5")))
        .await
        .unwrap();
    let b = second
        .add_interface(InterfaceRequest::external(addr("203.0.113.9"), "eth0"))
        .await
        .unwrap();

    assert_eq!((a.id, b.id), (1, 2));
}

#[tokio::test]
async fn test_requesting_base_name_returns_base() {
    let fx = Fixture::new();

    let base = fx.provisioner.container("base").await.unwrap();

    assert!(!base.is_cloned());
    assert_eq!(fx.lxc.count("lxc-create"), 1);
    assert_eq!(fx.lxc.count("lxc-copy"), 0);
}

#[tokio::test]
async fn test_inspection_failure_does_not_trigger_creation() {
    let lxc = FakeLxc::new();
    lxc.fail_tool("lxc-info", "Failed to connect to lxc monitor");
    let fx = Fixture::with_lxc(lxc);

    let err = fx.provisioner.container("web1").await.unwrap_err();

    assert!(matches!(
        err,
        ContainerError::Runtime(RuntimeError::Inspect { .. })
    ));
    assert_eq!(fx.lxc.count("lxc-create"), 0);
    assert_eq!(fx.lxc.count("lxc-copy"), 0);
}

#[tokio::test]
async fn test_packages_go_through_apk() {
    let fx = Fixture::new();
    let web1 = fx.provisioner.container("web1").await.unwrap();

    web1.install_packages(&["nginx".to_string()]).await.unwrap();

    let attached = fx.lxc.attached("web1");
    assert_eq!(attached.len(), 1);
    assert_eq!(attached[0][2], "apk update && apk add --no-cache nginx");
    assert_eq!(web1.state().await.unwrap(), State::Running);
}

#[tokio::test]
async fn test_summary_serializes() {
    let fx = Fixture::new();
    let mut web1 = fx.provisioner.container("web1").await.unwrap();
    web1.add_interface(InterfaceRequest::internal(addr("10.0.2.5/24")))
        .await
        .unwrap();

    let summary = web1.summary().await.unwrap();
    let json = serde_json::to_value(&summary).unwrap();

    assert_eq!(json["name"], "web1");
    assert_eq!(json["state"], "STOPPED");
    assert_eq!(json["rootfs"], "overlay");
    assert_eq!(json["interfaces"][0]["address"], "10.0.2.5/24");
    assert_eq!(json["interfaces"][0]["kind"], "internal");
}
