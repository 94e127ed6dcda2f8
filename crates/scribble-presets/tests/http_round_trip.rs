//! End-to-end over a real socket: client -> HTTP transport -> server -> service.

use std::net::TcpListener;
use std::sync::Arc;

use scribble_presets::{
    HttpTransport, Method, PresetClient, PresetError, PresetHttpServer, PresetRegistry,
    PresetService, PresetTransport, Request, ServerHandle, ServiceConfig,
};
use scribble_style::{Rgb, Theme};

fn serve() -> (ServerHandle, Arc<PresetService>) {
    let service = Arc::new(PresetService::new(
        PresetRegistry::in_memory(),
        &ServiceConfig::default(),
    ));
    let server = PresetHttpServer::bind("127.0.0.1:0", Arc::clone(&service)).unwrap();
    (server.spawn().unwrap(), service)
}

fn client(handle: &ServerHandle) -> PresetClient {
    PresetClient::new(Arc::new(HttpTransport::new(handle.base_url()).unwrap()))
}

#[test]
fn save_list_delete_over_http() {
    let (handle, service) = serve();
    let mut writer = client(&handle);
    assert!(writer.list().unwrap().is_empty());

    let red = Theme::DEFAULT.with_comment(Rgb::new(255, 0, 0));
    assert!(writer.save("my preset", "// a\nb", &red).unwrap());
    assert_eq!(writer.presets()[0].resolved_theme(), red);
    assert_eq!(service.registry().list().unwrap().presets.len(), 1);

    let mut reader = client(&handle);
    assert_eq!(reader.list().unwrap()[0].text, "// a\nb");

    assert!(writer.delete("my preset").unwrap());
    assert!(writer.presets().is_empty());
    assert!(service.registry().list().unwrap().presets.is_empty());
    handle.shutdown();
}

#[test]
fn server_errors_arrive_as_remote_errors() {
    let (handle, _service) = serve();
    let mut client = client(&handle);
    let err = client.save("a/b", "x", &Theme::DEFAULT).unwrap_err();
    assert!(matches!(err, PresetError::Remote { status: 400, .. }));
    assert_eq!(err.to_string(), "invalid preset name");
}

#[test]
fn status_codes_and_content_type() {
    let (handle, _service) = serve();
    let transport = HttpTransport::new(handle.base_url()).unwrap();
    let send = |method, path: &str, body: Option<&str>| {
        transport
            .send(Request {
                method,
                path: path.into(),
                body: body.map(str::to_string),
            })
            .unwrap()
    };

    assert_eq!(send(Method::Get, "/elsewhere", None).status, 404);
    assert_eq!(send(Method::Delete, "/scribblepad/presets", None).status, 405);
    assert_eq!(send(Method::Post, "/scribblepad/presets", Some("{oops")).status, 400);
    let ok = send(
        Method::Post,
        "/scribblepad/presets",
        Some(r#"{"name":"n","text":null,"theme":null}"#),
    );
    assert_eq!(ok.status, 200);
    let body: serde_json::Value = serde_json::from_str(&ok.body).unwrap();
    assert_eq!(body["presets"][0]["name"], "n");

    let raw = reqwest::blocking::get(format!("{}/scribblepad/presets", handle.base_url())).unwrap();
    assert_eq!(
        raw.headers()["content-type"].to_str().unwrap(),
        "application/json"
    );
    let put = reqwest::blocking::Client::new()
        .put(format!("{}/scribblepad/presets", handle.base_url()))
        .send()
        .unwrap();
    assert_eq!(put.status().as_u16(), 405);
}

#[test]
fn unreachable_server_is_a_transport_error() {
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let transport = HttpTransport::new(format!("http://127.0.0.1:{port}")).unwrap();
    let mut client = PresetClient::new(Arc::new(transport));
    assert!(matches!(client.list(), Err(PresetError::Transport(_))));
    assert!(client.presets().is_empty());
}
