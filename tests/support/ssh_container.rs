// ABOUTME: OpenSSH server container for live integration tests.
// ABOUTME: Uses bollard to start one shared container per test binary.

use bollard::Docker;
use bollard::models::{ContainerCreateBody, HostConfig, PortBinding};
use bollard::query_parameters::{
    CreateContainerOptions, CreateImageOptions, RemoveContainerOptions, StartContainerOptions,
};
use futures::StreamExt;
use sshrun::SessionBuilder;
use std::collections::HashMap;
use std::sync::OnceLock;
use std::time::Duration;

const IMAGE: &str = "lscr.io/linuxserver/openssh-server:latest";
const SSH_PORT: u16 = 2222;
pub const TEST_USER: &str = "testuser";

type BoxError = Box<dyn std::error::Error + Send + Sync>;

static CONTAINER_ID: OnceLock<String> = OnceLock::new();

/// Remove the container when the test binary exits.
#[ctor::dtor]
fn cleanup_on_exit() {
    let Some(id) = CONTAINER_ID.get() else {
        return;
    };
    let Ok(rt) = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    else {
        return;
    };
    rt.block_on(async {
        if let Ok(docker) = Docker::connect_with_local_defaults() {
            let _ = docker
                .remove_container(
                    id,
                    Some(RemoveContainerOptions {
                        force: true,
                        ..Default::default()
                    }),
                )
                .await;
        }
    });
}

static SHARED_CONTAINER: tokio::sync::OnceCell<SshContainer> = tokio::sync::OnceCell::const_new();

/// The shared SSH container, started on first use.
pub async fn shared_container() -> &'static SshContainer {
    SHARED_CONTAINER
        .get_or_init(|| async {
            SshContainer::start()
                .await
                .expect("failed to start SSH container")
        })
        .await
}

pub struct SshContainer {
    port: u16,
}

impl SshContainer {
    async fn start() -> Result<Self, BoxError> {
        let docker = Docker::connect_with_local_defaults()?;
        let public_key = std::fs::read_to_string(super::fixture("test_key.pub"))?;

        let mut pull = docker.create_image(
            Some(CreateImageOptions {
                from_image: Some(IMAGE.to_string()),
                ..Default::default()
            }),
            None,
            None,
        );
        while let Some(progress) = pull.next().await {
            progress?;
        }

        let port = {
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
            listener.local_addr()?.port()
        };

        let port_bindings = HashMap::from([(
            format!("{SSH_PORT}/tcp"),
            Some(vec![PortBinding {
                host_ip: Some("127.0.0.1".to_string()),
                host_port: Some(port.to_string()),
            }]),
        )]);

        let body = ContainerCreateBody {
            image: Some(IMAGE.to_string()),
            env: Some(vec![
                "PUID=1000".to_string(),
                "PGID=1000".to_string(),
                format!("USER_NAME={TEST_USER}"),
                format!("PUBLIC_KEY={}", public_key.trim()),
            ]),
            host_config: Some(HostConfig {
                port_bindings: Some(port_bindings),
                ..Default::default()
            }),
            ..Default::default()
        };

        let container = docker
            .create_container(
                Some(CreateContainerOptions {
                    name: Some(format!("sshrun-test-{}", std::process::id())),
                    ..Default::default()
                }),
                body,
            )
            .await?;
        let _ = CONTAINER_ID.set(container.id.clone());

        docker
            .start_container(&container.id, None::<StartContainerOptions>)
            .await?;

        wait_for_banner(port).await?;
        Ok(Self { port })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Builder pointed at this container with the fixture key.
    pub fn session_builder(&self) -> SessionBuilder {
        SessionBuilder::new()
            .host("127.0.0.1")
            .port(self.port)
            .user(TEST_USER)
            .private_key_path(super::fixture("test_key"))
    }
}

async fn wait_for_banner(port: u16) -> Result<(), BoxError> {
    use tokio::io::AsyncReadExt;

    let addr = format!("127.0.0.1:{port}");
    for _ in 0..60 {
        if let Ok(mut stream) = tokio::net::TcpStream::connect(&addr).await {
            let mut buf = [0u8; 32];
            if let Ok(Ok(n)) =
                tokio::time::timeout(Duration::from_secs(2), stream.read(&mut buf)).await
            {
                if buf[..n].starts_with(b"SSH-") {
                    tokio::time::sleep(Duration::from_millis(500)).await;
                    return Ok(());
                }
            }
        }
        tokio::time::sleep(Duration::from_millis(500)).await;
    }
    Err("SSH container did not become ready in time".into())
}
