//! Listing against a local HTTP server standing in for the GitHub API.

use bulkclone::prelude::*;
use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::thread::{self, JoinHandle};

struct Canned {
    status: &'static str,
    link: Option<String>,
    body: String,
}

impl Canned {
    fn ok(body: String) -> Self {
        Self {
            status: "200 OK",
            link: None,
            body,
        }
    }

    fn link(mut self, link: String) -> Self {
        self.link = Some(link);
        self
    }
}

fn repos_json(range: std::ops::Range<usize>) -> String {
    let repos: Vec<String> = range
        .map(|i| {
            format!(
                r#"{{"name": "svc-{i}", "clone_url": "https://github.com/acme/svc-{i}.git", "ssh_url": "git@github.com:acme/svc-{i}.git"}}"#
            )
        })
        .collect();
    format!("[{}]", repos.join(","))
}

/// Answers one connection per canned response and returns
/// `"<request line> | <authorization value>"` for each request.
fn serve(listener: TcpListener, responses: Vec<Canned>) -> JoinHandle<Vec<String>> {
    thread::spawn(move || {
        let mut seen = Vec::new();
        for canned in responses {
            let (mut stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());

            let mut request_line = String::new();
            reader.read_line(&mut request_line).unwrap();
            let mut auth = String::new();
            loop {
                let mut line = String::new();
                reader.read_line(&mut line).unwrap();
                if line.trim().is_empty() {
                    break;
                }
                if let Some((name, value)) = line.split_once(':') {
                    if name.eq_ignore_ascii_case("authorization") {
                        auth = value.trim().to_string();
                    }
                }
            }
            seen.push(format!("{} | {}", request_line.trim(), auth));

            let mut response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n",
                canned.status,
                canned.body.len()
            );
            if let Some(link) = canned.link {
                response.push_str(&format!("Link: {link}\r\n"));
            }
            response.push_str("\r\n");
            response.push_str(&canned.body);
            stream.write_all(response.as_bytes()).unwrap();
        }
        seen
    })
}

fn local_server() -> (TcpListener, String) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    (listener, base)
}

#[test]
fn test_150_repos_take_two_requests() {
    let (listener, base) = local_server();
    let server = serve(
        listener,
        vec![
            Canned::ok(repos_json(0..99)).link(format!(
                "<{base}/organizations/7/repos?type=all&per_page=99&page=2>; rel=\"next\", \
                 <{base}/organizations/7/repos?type=all&per_page=99&page=2>; rel=\"last\""
            )),
            Canned::ok(repos_json(99..150)).link(format!(
                "<{base}/organizations/7/repos?type=all&per_page=99&page=1>; rel=\"first\""
            )),
        ],
    );
    let client = GitHubClient::with_enterprise("tok", &base);

    let repos: Vec<RepoDescriptor> = OrgRepos::new(&client, "acme", PER_PAGE, Protocol::Ssh)
        .collect::<Result<_>>()
        .unwrap();

    assert_eq!(repos.len(), 150);
    assert_eq!(repos[149].clone_url, "git@github.com:acme/svc-149.git");
    assert_eq!(
        server.join().unwrap(),
        vec![
            "GET /orgs/acme/repos?type=all&per_page=99&page=1 HTTP/1.1 | Bearer tok",
            "GET /orgs/acme/repos?type=all&per_page=99&page=2 HTTP/1.1 | Bearer tok",
        ]
    );
}

#[test]
fn test_server_error_is_github_error() {
    let (listener, base) = local_server();
    let server = serve(
        listener,
        vec![Canned {
            status: "500 Internal Server Error",
            link: None,
            body: r#"{"message": "Server Error"}"#.into(),
        }],
    );
    let client = GitHubClient::with_enterprise("tok", &base);

    let err = client.list_org_repos_page("acme", 1, PER_PAGE).unwrap_err();

    match err {
        BulkCloneError::GitHub { message } => {
            assert!(message.contains("500"));
            assert!(message.contains("Server Error"));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(server.join().unwrap().len(), 1);
}

#[test]
fn test_next_link_without_page_is_error() {
    let (listener, base) = local_server();
    let server = serve(
        listener,
        vec![Canned::ok(repos_json(0..3)).link(format!(
            "<{base}/organizations/7/repos?type=all&after=abc>; rel=\"next\""
        ))],
    );
    let client = GitHubClient::with_enterprise("tok", &base);

    let err = client.list_org_repos_page("acme", 1, PER_PAGE).unwrap_err();

    assert!(matches!(err, BulkCloneError::GitHub { ref message } if message.contains("no page number")));
    assert_eq!(server.join().unwrap().len(), 1);
}

#[test]
fn test_last_page_has_no_next() {
    let (listener, base) = local_server();
    let server = serve(listener, vec![Canned::ok(repos_json(0..2))]);
    let client = GitHubClient::with_enterprise("tok", &base);

    let page = client.list_org_repos_page("acme", 1, PER_PAGE).unwrap();

    assert_eq!(page.repos.len(), 2);
    assert_eq!(page.next_page, None);
    server.join().unwrap();
}
