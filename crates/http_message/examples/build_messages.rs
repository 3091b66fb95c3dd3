use carbon_http_message::{HttpFactory, Response, prelude::*};

fn main() -> carbon_http_message::Result<()> {
    env_logger::init();

    let factory = HttpFactory::new();
    let uri = factory.create_uri("https://api.example.com/v1/users?active=true")?;
    let request = factory
        .create_request("GET", uri)?
        .with_header("Accept", "application/json")?;

    println!(
        "{} {} HTTP/{}",
        request.method(),
        request.request_target(),
        request.protocol_version()
    );
    for (name, values) in request.headers() {
        println!("{name}: {}", values.join(", "));
    }

    let response = Response::builder()
        .status(200)
        .header("Content-Type", "application/json")
        .bytes(r#"[{"id":1}]"#)
        .build()?;

    println!();
    println!(
        "HTTP/{} {} {}",
        response.protocol_version(),
        response.status_code(),
        response.reason_phrase()
    );
    for (name, values) in response.headers() {
        println!("{name}: {}", values.join(", "));
    }
    println!();
    println!("{}", response.body());
    Ok(())
}
