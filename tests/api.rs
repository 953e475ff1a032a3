mod common;

use serde_json::{Value, json};

const TEMPLATE_CONTENT: &str = "hostname {{ hostname }}\ninterface {{ interface }}\n vlan {{ vlan_id }}";

async fn create_project(client: &reqwest::Client, base_url: &str, name: &str) -> String {
    let resp = client
        .post(format!("{}/api/v1/projects", base_url))
        .json(&json!({"name": name}))
        .send()
        .await
        .expect("create project");
    assert_eq!(resp.status(), 201);

    let body: Value = resp.json().await.expect("parse project response");
    body["data"]["id"].as_str().expect("project id").to_string()
}

async fn create_template(
    client: &reqwest::Client,
    base_url: &str,
    project_id: &str,
    name: &str,
    content: &str,
) -> String {
    let resp = client
        .post(format!("{}/api/v1/projects/{}/templates", base_url, project_id))
        .json(&json!({"name": name, "template_content": content}))
        .send()
        .await
        .expect("create template");
    assert_eq!(resp.status(), 201);

    let body: Value = resp.json().await.expect("parse template response");
    body["data"]["id"].as_str().expect("template id").to_string()
}

async fn create_value_set(
    client: &reqwest::Client,
    base_url: &str,
    template_id: &str,
    hostname: &str,
    values: Value,
) -> String {
    let resp = client
        .post(format!(
            "{}/api/v1/templates/{}/value-sets",
            base_url, template_id
        ))
        .json(&json!({"hostname": hostname, "values": values}))
        .send()
        .await
        .expect("create value set");
    assert_eq!(resp.status(), 201);

    let body: Value = resp.json().await.expect("parse value set response");
    body["data"]["id"].as_str().expect("value set id").to_string()
}

async fn variable_names(client: &reqwest::Client, base_url: &str, template_id: &str) -> Vec<String> {
    let body: Value = client
        .get(format!(
            "{}/api/v1/templates/{}/variables",
            base_url, template_id
        ))
        .send()
        .await
        .expect("list variables")
        .json()
        .await
        .expect("parse variables response");

    body["data"]
        .as_array()
        .expect("variables array")
        .iter()
        .map(|v| v["name"].as_str().expect("variable name").to_string())
        .collect()
}

async fn value_map(client: &reqwest::Client, base_url: &str, value_set_id: &str) -> Vec<(String, String)> {
    let body: Value = client
        .get(format!("{}/api/v1/value-sets/{}/values", base_url, value_set_id))
        .send()
        .await
        .expect("list values")
        .json()
        .await
        .expect("parse values response");

    body["data"]
        .as_array()
        .expect("values array")
        .iter()
        .map(|v| {
            (
                v["variable_name"].as_str().expect("variable name").to_string(),
                v["value"].as_str().expect("value").to_string(),
            )
        })
        .collect()
}

#[tokio::test]
async fn project_name_conflicts() {
    let server = common::TestServer::start().await;
    let client = reqwest::Client::new();

    let project_id = create_project(&client, &server.base_url, "Campus LAN").await;

    let resp = client
        .post(format!("{}/api/v1/projects", server.base_url))
        .json(&json!({"name": "Campus LAN"}))
        .send()
        .await
        .expect("create duplicate project");
    assert_eq!(resp.status(), 409);
    let body: Value = resp.json().await.expect("parse conflict response");
    assert_eq!(
        body["error"].as_str().unwrap(),
        "Project name already exist, please use another one"
    );

    // Renaming onto an existing name is also a conflict.
    let other_id = create_project(&client, &server.base_url, "Branch Offices").await;
    let resp = client
        .patch(format!("{}/api/v1/projects/{}", server.base_url, other_id))
        .json(&json!({"name": "Campus LAN"}))
        .send()
        .await
        .expect("rename project");
    assert_eq!(resp.status(), 409);

    // A non-conflicting rename goes through.
    let resp = client
        .patch(format!("{}/api/v1/projects/{}", server.base_url, project_id))
        .json(&json!({"name": "Campus LAN v2"}))
        .send()
        .await
        .expect("rename project");
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.expect("parse rename response");
    assert_eq!(body["data"]["name"].as_str().unwrap(), "Campus LAN v2");
}

#[tokio::test]
async fn template_content_drives_variables() {
    let server = common::TestServer::start().await;
    let client = reqwest::Client::new();

    let project_id = create_project(&client, &server.base_url, "Datacenter").await;
    let template_id = create_template(
        &client,
        &server.base_url,
        &project_id,
        "switch-base",
        TEMPLATE_CONTENT,
    )
    .await;

    let names = variable_names(&client, &server.base_url, &template_id).await;
    assert_eq!(names, vec!["hostname", "interface", "vlan_id"]);

    let vs1 = create_value_set(&client, &server.base_url, &template_id, "sw-01", json!({})).await;
    let vs2 = create_value_set(&client, &server.base_url, &template_id, "sw-02", json!({})).await;

    // Dropping the vlan reference removes the variable and its values from
    // every value set; adding a new reference backfills them.
    let resp = client
        .patch(format!("{}/api/v1/templates/{}", server.base_url, template_id))
        .json(&json!({
            "template_content": "hostname {{ hostname }}\ninterface {{ interface }}\nntp {{ ntp_server }}"
        }))
        .send()
        .await
        .expect("update template content");
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.expect("parse update response");
    assert_eq!(
        body["data"]["reconciliation"]["added"],
        json!(["ntp_server"])
    );
    assert_eq!(
        body["data"]["reconciliation"]["removed"],
        json!(["vlan_id"])
    );

    let names = variable_names(&client, &server.base_url, &template_id).await;
    assert_eq!(names, vec!["hostname", "interface", "ntp_server"]);

    for vs_id in [&vs1, &vs2] {
        let values = value_map(&client, &server.base_url, vs_id).await;
        let names: Vec<&str> = values.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["hostname", "interface", "ntp_server"]);
    }
}

#[tokio::test]
async fn value_sets_bind_and_render() {
    let server = common::TestServer::start().await;
    let client = reqwest::Client::new();

    let project_id = create_project(&client, &server.base_url, "Datacenter").await;
    let template_id = create_template(
        &client,
        &server.base_url,
        &project_id,
        "switch-base",
        TEMPLATE_CONTENT,
    )
    .await;

    let vs_id = create_value_set(
        &client,
        &server.base_url,
        &template_id,
        "sw-01",
        json!({"interface": "Gi0/1"}),
    )
    .await;

    // One value per variable, hostname pre-bound to the value set's hostname.
    let values = value_map(&client, &server.base_url, &vs_id).await;
    assert_eq!(values.len(), 3);
    assert!(values.contains(&("hostname".to_string(), "sw-01".to_string())));
    assert!(values.contains(&("interface".to_string(), "Gi0/1".to_string())));

    // Bulk update; the hostname variable stays read-only.
    let resp = client
        .put(format!("{}/api/v1/value-sets/{}/values", server.base_url, vs_id))
        .json(&json!({"values": {"vlan_id": "100", "hostname": "ignored"}}))
        .send()
        .await
        .expect("set values");
    assert_eq!(resp.status(), 200);

    let values = value_map(&client, &server.base_url, &vs_id).await;
    assert!(values.contains(&("vlan_id".to_string(), "100".to_string())));
    assert!(values.contains(&("hostname".to_string(), "sw-01".to_string())));

    let resp = client
        .put(format!("{}/api/v1/value-sets/{}/values", server.base_url, vs_id))
        .json(&json!({"values": {"no_such_variable": "x"}}))
        .send()
        .await
        .expect("set unknown value");
    assert_eq!(resp.status(), 400);

    // Duplicate hostname within the template is a conflict.
    let resp = client
        .post(format!(
            "{}/api/v1/templates/{}/value-sets",
            server.base_url, template_id
        ))
        .json(&json!({"hostname": "sw-01"}))
        .send()
        .await
        .expect("create duplicate value set");
    assert_eq!(resp.status(), 409);

    let rendered = client
        .get(format!("{}/api/v1/value-sets/{}/config", server.base_url, vs_id))
        .send()
        .await
        .expect("render config")
        .text()
        .await
        .expect("rendered text");
    assert_eq!(rendered, "hostname sw-01\ninterface Gi0/1\n vlan 100");

    // Renaming the value set rewrites the bound hostname value.
    let resp = client
        .patch(format!("{}/api/v1/value-sets/{}", server.base_url, vs_id))
        .json(&json!({"hostname": "sw-99"}))
        .send()
        .await
        .expect("rename value set");
    assert_eq!(resp.status(), 200);

    let values = value_map(&client, &server.base_url, &vs_id).await;
    assert!(values.contains(&("hostname".to_string(), "sw-99".to_string())));
}

#[tokio::test]
async fn variable_rename_guards() {
    let server = common::TestServer::start().await;
    let client = reqwest::Client::new();

    let project_id = create_project(&client, &server.base_url, "Datacenter").await;
    let template_id = create_template(
        &client,
        &server.base_url,
        &project_id,
        "switch-base",
        "interface {{ interface }}\n vlan {{ vlan_id }}",
    )
    .await;

    let body: Value = client
        .get(format!(
            "{}/api/v1/templates/{}/variables",
            server.base_url, template_id
        ))
        .send()
        .await
        .expect("list variables")
        .json()
        .await
        .expect("parse variables");
    let variables = body["data"].as_array().expect("variables array");
    let interface_id = variables
        .iter()
        .find(|v| v["name"] == "interface")
        .and_then(|v| v["id"].as_str())
        .expect("interface variable id");

    // The reserved name is always rejected.
    let resp = client
        .patch(format!("{}/api/v1/variables/{}", server.base_url, interface_id))
        .json(&json!({"name": "hostname"}))
        .send()
        .await
        .expect("rename to reserved");
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.expect("parse reserved response");
    assert_eq!(
        body["error"].as_str().unwrap(),
        "hostname is reserved by the application, please choose another one"
    );

    // Renaming onto an existing sibling slug is a conflict.
    let resp = client
        .patch(format!("{}/api/v1/variables/{}", server.base_url, interface_id))
        .json(&json!({"name": "VLAN Id"}))
        .send()
        .await
        .expect("rename to sibling");
    assert_eq!(resp.status(), 409);

    // Free-form names are slugified.
    let resp = client
        .patch(format!("{}/api/v1/variables/{}", server.base_url, interface_id))
        .json(&json!({"name": "Uplink Port", "description": "physical uplink"}))
        .send()
        .await
        .expect("rename variable");
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.expect("parse rename response");
    assert_eq!(body["data"]["name"].as_str().unwrap(), "uplink_port");
    assert_eq!(
        body["data"]["description"].as_str().unwrap(),
        "physical uplink"
    );
}

#[tokio::test]
async fn export_writes_rendered_files() {
    let server = common::TestServer::start().await;
    let client = reqwest::Client::new();

    let project_id = create_project(&client, &server.base_url, "Datacenter").await;
    let template_id = create_template(
        &client,
        &server.base_url,
        &project_id,
        "switch-base",
        "hostname {{ hostname }}",
    )
    .await;

    create_value_set(&client, &server.base_url, &template_id, "sw-01", json!({})).await;
    create_value_set(&client, &server.base_url, &template_id, "sw-02", json!({})).await;

    let resp = client
        .post(format!("{}/api/v1/templates/{}/export", server.base_url, template_id))
        .send()
        .await
        .expect("export template");
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.expect("parse export response");
    assert_eq!(body["data"]["exported"], json!(["sw-01", "sw-02"]));

    let exported = server
        .data_dir()
        .join("export")
        .join("Datacenter")
        .join("switch-base")
        .join("sw-01.txt");
    let content = std::fs::read_to_string(&exported).expect("read exported config");
    assert_eq!(content, "hostname sw-01");
}

#[tokio::test]
async fn deleting_a_project_cascades() {
    let server = common::TestServer::start().await;
    let client = reqwest::Client::new();

    let project_id = create_project(&client, &server.base_url, "Datacenter").await;
    let template_id = create_template(
        &client,
        &server.base_url,
        &project_id,
        "switch-base",
        TEMPLATE_CONTENT,
    )
    .await;
    let vs_id = create_value_set(&client, &server.base_url, &template_id, "sw-01", json!({})).await;

    let resp = client
        .delete(format!("{}/api/v1/projects/{}", server.base_url, project_id))
        .send()
        .await
        .expect("delete project");
    assert_eq!(resp.status(), 204);

    for url in [
        format!("{}/api/v1/templates/{}", server.base_url, template_id),
        format!("{}/api/v1/value-sets/{}", server.base_url, vs_id),
    ] {
        let resp = client.get(url).send().await.expect("get deleted resource");
        assert_eq!(resp.status(), 404);
    }
}
