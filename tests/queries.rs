//! Aggregated query tests: WHOIS, NAMES, WHO, LIST, MOTD.

use std::sync::Arc;
use std::time::Duration;

use slirc_client::{
    Client, ClientError, EventStream, MockTransport, RateLimitConfig, SessionConfig,
};

fn test_config(nick: &str) -> SessionConfig {
    let mut config = SessionConfig::new("irc.test.example", nick);
    config.rate_limit = RateLimitConfig {
        messages_per_window: 100,
        window: Duration::from_secs(1),
    };
    config
}

async fn wait_for_lines(mock: &MockTransport, n: usize) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while mock.written_len() < n {
            tokio::time::sleep(Duration::from_millis(2)).await;
        }
    })
    .await
    .unwrap_or_else(|_| {
        panic!(
            "expected {} outbound lines, got {:?}",
            n,
            mock.written_lines()
        )
    });
}

async fn registered_client(nick: &str) -> (Client, EventStream, Arc<MockTransport>) {
    let (client, events) = Client::new(test_config(nick));
    let mock = Arc::new(MockTransport::new());
    client.connect_with_transport(mock.clone()).await.unwrap();

    wait_for_lines(&mock, 2).await;
    mock.queue_read(format!(":server 001 {} :Welcome", nick));
    client.await_registered().await.unwrap();
    mock.take_written();

    (client, events, mock)
}

#[tokio::test]
async fn whois_aggregates_until_terminator() {
    let (client, _events, mock) = registered_client("TestBot").await;

    let (reply, _) = tokio::join!(client.whois("alice"), async {
        wait_for_lines(&mock, 1).await;
        assert_eq!(mock.written_lines(), vec!["WHOIS alice"]);
        mock.queue_read(":s 311 TestBot alice ali host.example * :Alice Example");
        mock.queue_read(":s 312 TestBot alice irc.example.org :Test server");
        mock.queue_read(":s 319 TestBot alice :#chan1 #chan2");
        mock.queue_read(":s 318 TestBot alice :End of /WHOIS list");
    });

    let reply = reply.unwrap();
    assert_eq!(reply.nick, "alice");
    assert_eq!(reply.username.as_deref(), Some("ali"));
    assert_eq!(reply.host.as_deref(), Some("host.example"));
    assert_eq!(reply.realname.as_deref(), Some("Alice Example"));
    assert_eq!(reply.server.as_deref(), Some("irc.example.org"));
    assert_eq!(reply.channels, vec!["#chan1", "#chan2"]);
}

#[tokio::test]
async fn duplicate_whois_is_rejected_while_in_flight() {
    let (client, _events, mock) = registered_client("TestBot").await;

    let (first, _) = tokio::join!(client.whois("alice"), async {
        wait_for_lines(&mock, 1).await;

        // A second query for the same key must fail fast while the first
        // is still pending; case folding makes ALICE the same key.
        let second = client.whois("ALICE").await;
        assert!(matches!(second, Err(ClientError::QueryInFlight(_))));
        // Only one WHOIS line went out.
        assert_eq!(mock.written_len(), 1);

        mock.queue_read(":s 311 TestBot alice ali host.example * :Alice");
        mock.queue_read(":s 318 TestBot alice :End of /WHOIS list");
    });
    first.unwrap();

    // With the first resolved, the key is free again.
    let (again, _) = tokio::join!(client.whois("alice"), async {
        wait_for_lines(&mock, 2).await;
        mock.queue_read(":s 318 TestBot alice :End of /WHOIS list");
    });
    again.unwrap();
}

#[tokio::test]
async fn whois_unknown_nick_reports_error_reply() {
    let (client, _events, mock) = registered_client("TestBot").await;

    let (reply, _) = tokio::join!(client.whois("ghost"), async {
        wait_for_lines(&mock, 1).await;
        mock.queue_read(":s 401 TestBot ghost :No such nick/channel");
    });

    match reply {
        Err(ClientError::ErrorReply { code: 401, message }) => {
            assert_eq!(message, "No such nick/channel");
        }
        other => panic!("expected 401 error reply, got {:?}", other),
    }
}

#[tokio::test]
async fn names_collects_across_fragments() {
    let (client, _events, mock) = registered_client("TestBot").await;

    let (names, _) = tokio::join!(client.names("#rust"), async {
        wait_for_lines(&mock, 1).await;
        assert_eq!(mock.written_lines(), vec!["NAMES #rust"]);
        mock.queue_read(":s 353 TestBot = #rust :@op +voiced");
        mock.queue_read(":s 353 TestBot = #rust :plain");
        mock.queue_read(":s 366 TestBot #rust :End of /NAMES list");
    });

    assert_eq!(names.unwrap(), vec!["op", "voiced", "plain"]);
}

#[tokio::test]
async fn who_collects_rows() {
    let (client, _events, mock) = registered_client("TestBot").await;

    let (entries, _) = tokio::join!(client.who("#rust"), async {
        wait_for_lines(&mock, 1).await;
        assert_eq!(mock.written_lines(), vec!["WHO #rust"]);
        mock.queue_read(
            ":s 352 TestBot #rust ali host.example irc.example.org alice H :0 Alice Example",
        );
        mock.queue_read(
            ":s 352 TestBot #rust bob host.example irc.example.org bobby G :1 Bob",
        );
        mock.queue_read(":s 315 TestBot #rust :End of /WHO list");
    });

    let entries = entries.unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].nick, "alice");
    assert_eq!(entries[0].realname, "Alice Example");
    assert_eq!(entries[1].nick, "bobby");
    assert_eq!(entries[1].hops, Some(1));
}

#[tokio::test]
async fn list_collects_channels() {
    let (client, _events, mock) = registered_client("TestBot").await;

    let (rows, _) = tokio::join!(client.list(), async {
        wait_for_lines(&mock, 1).await;
        assert_eq!(mock.written_lines(), vec!["LIST"]);
        mock.queue_read(":s 321 TestBot Channel :Users Name");
        mock.queue_read(":s 322 TestBot #rust 42 :Rust talk");
        mock.queue_read(":s 322 TestBot #quiet 1 :");
        mock.queue_read(":s 323 TestBot :End of /LIST");
    });

    let rows = rows.unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].channel, "#rust");
    assert_eq!(rows[0].user_count, Some(42));
    assert_eq!(rows[0].topic, "Rust talk");
}

#[tokio::test]
async fn motd_collects_lines() {
    let (client, _events, mock) = registered_client("TestBot").await;

    let (lines, _) = tokio::join!(client.motd(), async {
        wait_for_lines(&mock, 1).await;
        assert_eq!(mock.written_lines(), vec!["MOTD"]);
        mock.queue_read(":s 375 TestBot :- irc.test.example Message of the day -");
        mock.queue_read(":s 372 TestBot :- Hello.");
        mock.queue_read(":s 372 TestBot :- Enjoy.");
        mock.queue_read(":s 376 TestBot :End of /MOTD command");
    });

    assert_eq!(lines.unwrap(), vec!["- Hello.", "- Enjoy."]);
}

#[tokio::test]
async fn missing_motd_reports_error_reply() {
    let (client, _events, mock) = registered_client("TestBot").await;

    let (lines, _) = tokio::join!(client.motd(), async {
        wait_for_lines(&mock, 1).await;
        mock.queue_read(":s 422 TestBot :MOTD File is missing");
    });

    assert!(matches!(
        lines,
        Err(ClientError::ErrorReply { code: 422, .. })
    ));
}

#[tokio::test]
async fn concurrent_queries_with_different_keys_run_in_parallel() {
    let (client, _events, mock) = registered_client("TestBot").await;

    let (whois, names, _) = tokio::join!(
        client.whois("alice"),
        client.names("#rust"),
        async {
            wait_for_lines(&mock, 2).await;
            // Interleaved replies route to their own collectors.
            mock.queue_read(":s 353 TestBot = #rust :alice bob");
            mock.queue_read(":s 311 TestBot alice ali h * :Alice");
            mock.queue_read(":s 366 TestBot #rust :End of /NAMES list");
            mock.queue_read(":s 318 TestBot alice :End of /WHOIS list");
        }
    );

    assert_eq!(whois.unwrap().username.as_deref(), Some("ali"));
    assert_eq!(names.unwrap(), vec!["alice", "bob"]);
}

#[tokio::test(start_paused = true)]
async fn query_times_out_without_replies() {
    let (client, _events, mock) = registered_client("TestBot").await;

    let result = client.whois("silent").await;
    assert!(matches!(result, Err(ClientError::QueryTimeout)));

    // The entry was removed: the same query can start again.
    let (second, _) = tokio::join!(client.whois("silent"), async {
        wait_for_lines(&mock, 2).await;
        mock.queue_read(":s 318 TestBot silent :End of /WHOIS list");
    });
    second.unwrap();
}

#[tokio::test]
async fn disconnect_fails_pending_queries() {
    let (client, _events, mock) = registered_client("TestBot").await;

    let (pending, _) = tokio::join!(client.whois("alice"), async {
        wait_for_lines(&mock, 1).await;
        mock.queue_eof();
    });

    assert!(matches!(pending, Err(ClientError::Disconnected)));
}
