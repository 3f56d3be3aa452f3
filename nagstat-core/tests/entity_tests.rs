//! Integration tests for core entity types.

use nagstat_core::{Attempt, Host, HostMap, Service, ServiceExtension, Status, StatusType};

#[test]
fn test_host_map_serializes_for_json_consumers() {
    let mut host = Host::new("web01", "prod", Status::Down);
    host.status_type = Some(StatusType::Hard);
    host.attempt = Some(Attempt::new(3, 3));

    let mut service = Service::new("web01", "http", "prod", Status::Critical);
    service.extension = Some(ServiceExtension::Opsview {
        service_object_id: "17".into(),
    });
    host.add_service(service);

    let mut map = HostMap::new();
    map.insert(host.name.clone(), host);

    let json = serde_json::to_value(&map).unwrap();
    assert_eq!(json["web01"]["status"], "DOWN");
    assert_eq!(json["web01"]["status_type"], "HARD");
    assert_eq!(json["web01"]["services"]["http"]["extension"]["backend"], "opsview");

    let parsed: HostMap = serde_json::from_value(json).unwrap();
    assert_eq!(parsed, map);
}

#[test]
fn test_service_names_are_unique_per_host() {
    let mut host = Host::synthesized("db01", "prod");
    host.add_service(Service::new("db01", "disk", "prod", Status::Warning));
    host.add_service(Service::new("db01", "disk", "prod", Status::Critical));

    assert_eq!(host.services.len(), 1);
    assert_eq!(host.services["disk"].status, Status::Critical);
}
