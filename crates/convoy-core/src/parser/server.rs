use super::{expect_mapping, located, spelled};
use crate::accessor::{
    get_bool, get_int, get_json, get_list, get_scalar, line_of, require_mapping,
};
use crate::document::Node;
use crate::error::Result;
use crate::model::{OsParts, OsReference, Plan, Server};

/// Parses one `servers` item.
pub fn parse_server(node: &Node) -> Result<Server> {
    expect_mapping(node, "server")?;

    let os = parse_os(node)?;
    let plan = parse_plan(require_mapping(node, "plan")?)?;
    let region = get_scalar(node, "region", "", true)?;

    let label = get_scalar(node, "label", "", false)?;
    let tag = get_scalar(node, "tag", "", false)?;
    let firewall = get_scalar(node, "firewall", "", false)?;
    let script_key = spelled(node, "startup_script", "startup-script");
    let startup_script = get_scalar(node, script_key, "", false)?;
    let user_data = get_json(node, spelled(node, "user_data", "user-data"), false)?;
    let ssh_keys = get_list(node, spelled(node, "ssh_keys", "ssh-keys"));
    let private_networking = get_bool(
        node,
        spelled(node, "private_networking", "private-networking"),
        false,
        false,
    )?;

    Server::new(os, plan, region)
        .map_err(|v| located(node, v))?
        .with_label(label)
        .with_tag(tag)
        .with_firewall(firewall)
        .with_user_data(user_data)
        .with_ssh_keys(ssh_keys)
        .with_private_networking(private_networking)
        .with_startup_script(startup_script)
        .map_err(|v| v.at(line_of(node, script_key)))
}

fn parse_os(server: &Node) -> Result<OsReference> {
    let os = require_mapping(server, "os")?;
    let script_key = spelled(os, "startup_script", "startup-script");
    let parts = OsParts {
        name: get_scalar(os, "name", "", false)?,
        app: get_scalar(os, "app", "", false)?,
        iso: get_scalar(os, "iso", "", false)?,
        snapshot: get_scalar(os, "snapshot", "", false)?,
        startup_script: get_scalar(os, script_key, "", false)?,
    };
    OsReference::select(parts).map_err(|v| v.at(line_of(server, "os")))
}

fn parse_plan(plan: &Node) -> Result<Plan> {
    let cpu = get_int(plan, "cpu", 0, true)?;
    let memory = get_int(plan, "memory", 0, true)?;
    let plan_type = get_scalar(plan, "type", "", true)?;
    Plan::new(cpu, memory, plan_type).map_err(|v| located(plan, v))
}
