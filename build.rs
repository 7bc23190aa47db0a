fn main() {
    println!("cargo:rerun-if-env-changed=RELAY_CONFIG_JSON");
    println!("cargo:rerun-if-env-changed=RELAY_WIFI_SSID");
    println!("cargo:rerun-if-env-changed=RELAY_WIFI_PASSWORD");

    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
