use offscrub_detect::{
    ArchitectureTag, DetectionFault, Detector, InstallMechanism, OsName, ProductId, keys,
};
use offscrub_platform::{FileVersion, MemoryPlatform, View};
use proptest::prelude::*;

fn windows(major: u32, minor: u32, build: u32) -> MemoryPlatform {
    MemoryPlatform::new().with_file_version(FileVersion::new(major, minor, build, 0))
}

fn with_sku(platform: MemoryPlatform, build: &str, sku: &str) -> MemoryPlatform {
    platform.with_query_row(
        keys::CIMV2,
        keys::OPERATING_SYSTEM_QUERY,
        [("BuildNumber", build), ("OperatingSystemSKU", sku)],
    )
}

fn install_root(platform: MemoryPlatform, view: View, generation: u8, path: &str) -> MemoryPlatform {
    platform.with_value(view, keys::install_root(generation), "Path", path)
}

fn click_to_run(platform: MemoryPlatform) -> MemoryPlatform {
    platform
        .with_service("ClickToRunSvc")
        .with_value(View::Registry64, keys::CLICK_TO_RUN, "PackageGUID", "{9AC08E99-230B-47e8-9721-4577B7F124EA}")
}

mod os {
    use super::*;

    #[test]
    fn windows_7_client() {
        let platform = windows(6, 1, 7601);
        let detector = Detector::new(&platform);
        assert_eq!(detector.windows_product_name().unwrap(), OsName::Windows7);
        assert_eq!(detector.windows_build_number().unwrap(), 7601);
        assert!(detector.is_windows_supported().unwrap());
    }

    #[test]
    fn server_flag_selects_server_release() {
        let platform = windows(10, 0, 17763).with_server(true);
        let detector = Detector::new(&platform);
        assert!(detector.is_windows_server().unwrap());
        assert_eq!(detector.windows_product_name().unwrap(), OsName::WindowsServer2019);
    }

    #[test]
    fn rdsh_server_reports_as_client() {
        let platform = with_sku(windows(10, 0, 19045).with_server(true), "19045", "175");
        let detector = Detector::new(&platform);
        assert!(detector.is_server_rdsh().unwrap());
        assert!(!detector.is_windows_server().unwrap());
        assert_eq!(detector.windows_product_name().unwrap(), OsName::Windows10);
    }

    #[test]
    fn rdsh_is_never_checked_below_threshold_build() {
        let platform = with_sku(windows(10, 0, 14393).with_server(true), "14393", "175");
        let detector = Detector::new(&platform);
        assert!(!detector.is_server_rdsh().unwrap());
        assert_eq!(detector.windows_product_name().unwrap(), OsName::WindowsServer2016);
    }

    #[test]
    fn rdsh_transport_failure_degrades_to_false() {
        let platform = windows(10, 0, 20348)
            .with_server(true)
            .with_transport_failure();
        let detector = Detector::new(&platform);
        assert!(!detector.is_server_rdsh().unwrap());
        assert_eq!(detector.windows_product_name().unwrap(), OsName::WindowsServer2022);
    }

    #[test]
    fn branding_upgrades_windows_10_label() {
        let platform = windows(10, 0, 22631).with_branding("%WINDOWS_LONG%", "Windows 11 Pro");
        let detector = Detector::new(&platform);
        assert_eq!(detector.windows_product_name().unwrap(), OsName::Windows11);
    }

    #[test]
    fn branding_without_marker_keeps_windows_10() {
        let platform = windows(10, 0, 19045).with_branding("%WINDOWS_LONG%", "Windows 10 Enterprise");
        let detector = Detector::new(&platform);
        assert_eq!(detector.windows_product_name().unwrap(), OsName::Windows10);
    }

    #[test]
    fn branding_never_touches_server_names() {
        let platform = windows(10, 0, 20348)
            .with_server(true)
            .with_branding("%WINDOWS_LONG%", "Windows 11 Pro");
        let detector = Detector::new(&platform);
        assert_eq!(detector.windows_product_name().unwrap(), OsName::WindowsServer2022);
    }

    #[test]
    fn management_build_refines_new_builds() {
        let platform = with_sku(windows(10, 0, 19041), "19045", "48");
        assert_eq!(Detector::new(&platform).windows_build_number().unwrap(), 19045);
    }

    #[test]
    fn blank_management_build_keeps_file_build() {
        let platform = with_sku(windows(10, 0, 19041), " ", "48");
        assert_eq!(Detector::new(&platform).windows_build_number().unwrap(), 19041);
    }

    #[test]
    fn transport_failure_falls_back_to_registry_build() {
        let platform = windows(10, 0, 19041)
            .with_transport_failure()
            .with_value(View::Registry64, keys::CURRENT_VERSION, "CurrentBuild", "19045");
        assert_eq!(Detector::new(&platform).windows_build_number().unwrap(), 19045);
    }

    #[test]
    fn transport_failure_without_registry_keeps_file_build() {
        let platform = windows(10, 0, 19041).with_transport_failure();
        assert_eq!(Detector::new(&platform).windows_build_number().unwrap(), 19041);
    }

    #[test]
    fn old_builds_skip_management_engine() {
        let platform = with_sku(windows(10, 0, 17134), "99999", "48");
        assert_eq!(Detector::new(&platform).windows_build_number().unwrap(), 17134);
    }

    #[test]
    fn support_window_is_vista_through_11() {
        assert!(!Detector::new(&windows(5, 1, 2600)).is_windows_supported().unwrap());
        assert!(Detector::new(&windows(6, 0, 6002)).is_windows_supported().unwrap());
        assert!(Detector::new(&windows(11, 0, 0)).is_windows_supported().unwrap());
        assert!(!Detector::new(&windows(12, 0, 0)).is_windows_supported().unwrap());
        assert_eq!(Detector::new(&windows(6, 2, 9200)).windows_number().unwrap(), 6.2);
    }

    #[test]
    fn missing_version_resource_propagates() {
        let platform = MemoryPlatform::new();
        let err = Detector::new(&platform).windows_product_name().unwrap_err();
        assert!(matches!(err, DetectionFault::Platform(e) if e.is_not_available()));
    }

    #[test]
    fn licensing_versions_read_first_row() {
        let platform = windows(10, 0, 19045)
            .with_query_row(keys::CIMV2, keys::WINDOWS_LICENSING_QUERY, [("Version", "10.0.19041.3636")])
            .with_query_row(keys::CIMV2, keys::WINDOWS_LICENSING_QUERY, [("Version", "ignored")]);
        let detector = Detector::new(&platform);
        assert_eq!(detector.windows_licensing_version().unwrap(), "10.0.19041.3636");
        assert!(matches!(
            detector.office_licensing_version(),
            Err(DetectionFault::LicensingServiceUnavailable { .. })
        ));
    }

    #[test]
    fn licensing_transport_failure_propagates() {
        let platform = windows(10, 0, 19045).with_transport_failure();
        let err = Detector::new(&platform).windows_licensing_version().unwrap_err();
        assert!(matches!(err, DetectionFault::Platform(e) if e.is_transport()));
    }

    proptest! {
        #[test]
        fn unmapped_majors_are_unknown(
            major in prop_oneof![0u32..3, 7u32..10, 12u32..1000],
            minor in 0u32..100,
            build in 0u32..30000,
            server in any::<bool>(),
        ) {
            let name = OsName::from_version(FileVersion::new(major, minor, build, 0), server);
            prop_assert_eq!(name, OsName::Unknown);
        }

        #[test]
        fn server_2016_to_2022_follow_build_thresholds(build in 0u32..40000) {
            let name = OsName::from_version(FileVersion::new(10, 0, build, 0), true);
            let expected = if build >= 20251 {
                OsName::WindowsServer2022
            } else if build >= 17763 {
                OsName::WindowsServer2019
            } else {
                OsName::WindowsServer2016
            };
            prop_assert_eq!(name, expected);
        }

        #[test]
        fn client_10_0_is_always_windows_10(build in 0u32..40000) {
            let name = OsName::from_version(FileVersion::new(10, 0, build, 0), false);
            prop_assert_eq!(name, OsName::Windows10);
        }
    }
}

mod architecture {
    use super::*;

    #[test]
    fn os_architecture_matrix() {
        let cases = [
            (false, false, ArchitectureTag::Native32),
            (false, true, ArchitectureTag::NativeARM64),
            (true, false, ArchitectureTag::Native64),
            (true, true, ArchitectureTag::NativeARM64),
        ];
        for (is_64bit, arm, expected) in cases {
            let platform = MemoryPlatform::new().with_64bit(is_64bit).with_arm_marker(arm);
            assert_eq!(Detector::new(&platform).os_architecture(), expected);
        }
    }

    #[test]
    fn office_on_32bit_os() {
        let platform = MemoryPlatform::new().with_64bit(false);
        assert_eq!(
            Detector::new(&platform).office_architecture().unwrap(),
            ArchitectureTag::Native32
        );
        let platform = platform.with_arm_marker(true);
        assert_eq!(
            Detector::new(&platform).office_architecture().unwrap(),
            ArchitectureTag::HybridARM64on32
        );
    }

    #[test]
    fn legacy_generations_are_always_emulated() {
        for generation in [11, 12] {
            let platform = install_root(MemoryPlatform::new(), View::Registry64, generation, r"C:\Office");
            let platform = platform
                .with_value(View::Registry64, keys::CLICK_TO_RUN_CONFIGURATION, "Platform", "x64");
            assert_eq!(
                Detector::new(&platform).office_architecture().unwrap(),
                ArchitectureTag::EmulatedWOW64
            );
        }
    }

    #[test]
    fn traditional_32bit_view_means_wow64() {
        let platform = install_root(MemoryPlatform::new(), View::Registry32, 16, r"C:\Program Files (x86)\Microsoft Office\root\Office16\");
        assert_eq!(
            Detector::new(&platform).office_architecture().unwrap(),
            ArchitectureTag::EmulatedWOW64
        );
    }

    #[test]
    fn traditional_64bit_view_means_native() {
        let platform = install_root(MemoryPlatform::new(), View::Registry64, 14, r"C:\Program Files\Microsoft Office\Office14\");
        assert_eq!(
            Detector::new(&platform).office_architecture().unwrap(),
            ArchitectureTag::Native64
        );
    }

    #[test]
    fn click_to_run_platform_with_arm_marker() {
        let platform = click_to_run(MemoryPlatform::new())
            .with_arm_marker(true)
            .with_value(View::Registry64, keys::CLICK_TO_RUN_CONFIGURATION, "Platform", "x64");
        assert_eq!(
            Detector::new(&platform).office_architecture().unwrap(),
            ArchitectureTag::HybridARM64on64
        );

        let platform = click_to_run(MemoryPlatform::new())
            .with_arm_marker(true)
            .with_value(View::Registry32, keys::CLICK_TO_RUN_CONFIGURATION, "Platform", "X86");
        assert_eq!(
            Detector::new(&platform).office_architecture().unwrap(),
            ArchitectureTag::HybridARM64on32
        );
    }

    #[test]
    fn click_to_run_32bit_view_is_checked_first() {
        let platform = click_to_run(MemoryPlatform::new())
            .with_value(View::Registry32, keys::CLICK_TO_RUN_CONFIGURATION, "Platform", "x86")
            .with_value(View::Registry64, keys::CLICK_TO_RUN_CONFIGURATION, "Platform", "x64");
        assert_eq!(
            Detector::new(&platform).office_architecture().unwrap(),
            ArchitectureTag::EmulatedWOW64
        );
    }

    #[test]
    fn generation_15_platform_node() {
        let platform = click_to_run(MemoryPlatform::new())
            .with_value(View::Registry64, keys::CLICK_TO_RUN_15_CONFIGURATION, "Platform", "x86");
        assert_eq!(
            Detector::new(&platform).office_architecture().unwrap(),
            ArchitectureTag::EmulatedWOW64
        );

        let platform = click_to_run(MemoryPlatform::new())
            .with_value(View::Registry64, keys::CLICK_TO_RUN_15_CONFIGURATION, "Platform", "amd64");
        assert_eq!(
            Detector::new(&platform).office_architecture().unwrap(),
            ArchitectureTag::Native64
        );
    }

    #[test]
    fn no_evidence_is_unsupported_architecture() {
        let platform = click_to_run(MemoryPlatform::new());
        assert!(matches!(
            Detector::new(&platform).office_architecture(),
            Err(DetectionFault::UnsupportedArchitecture)
        ));
    }
}

mod office {
    use super::*;

    #[test]
    fn virtualized_requires_service_and_package_id() {
        let id_only = MemoryPlatform::new()
            .with_value(View::Registry64, keys::CLICK_TO_RUN, "PackageGUID", "{guid}");
        assert!(!Detector::new(&id_only).is_office_virtualized().unwrap());

        let service_only = MemoryPlatform::new().with_service("OfficeSvc");
        assert!(!Detector::new(&service_only).is_office_virtualized().unwrap());

        let both = service_only.with_value(View::Registry32, keys::CLICK_TO_RUN_15, "PackageGUID", "{guid}");
        assert!(Detector::new(&both).is_office_virtualized().unwrap());
    }

    #[test]
    fn first_generation_in_probe_order_wins() {
        let platform = MemoryPlatform::new();
        let platform = install_root(platform, View::Registry32, 14, r"C:\Office14\");
        let platform = install_root(platform, View::Registry64, 12, r"C:\Office12\");
        let platform = install_root(platform, View::Registry64, 11, r"C:\Office11\");

        let detector = Detector::new(&platform);
        assert_eq!(detector.office_name().unwrap(), ProductId::Office2010);
        assert_eq!(detector.office_number().unwrap(), 14);
    }

    #[test]
    fn newer_generation_masks_older() {
        let platform = install_root(MemoryPlatform::new(), View::Registry64, 14, r"C:\Office14\");
        let platform = install_root(platform, View::Registry32, 16, r"C:\Office16\");
        assert_eq!(Detector::new(&platform).office_name().unwrap(), ProductId::Office2016);
    }

    #[test]
    fn blank_install_path_is_ignored() {
        let platform = install_root(MemoryPlatform::new(), View::Registry64, 16, "");
        let platform = install_root(platform, View::Registry64, 15, r"C:\Office15\");
        assert_eq!(Detector::new(&platform).office_name().unwrap(), ProductId::Office2013);
    }

    #[test]
    fn release_ids_pick_streamed_release() {
        let platform = click_to_run(MemoryPlatform::new()).with_value(
            View::Registry64,
            keys::CLICK_TO_RUN_CONFIGURATION,
            "ProductReleaseIds",
            "ProPlus2021Volume,VisioPro2021Volume",
        );
        let product = Detector::new(&platform).office_name().unwrap();
        assert_eq!(product, ProductId::Office2021);
        assert_eq!(product.mechanism(), InstallMechanism::Virtualized);
    }

    #[test]
    fn culture_node_identifies_2013_click_to_run() {
        let platform = click_to_run(MemoryPlatform::new()).with_value(
            View::Registry32,
            keys::CLICK_TO_RUN_15_CULTURE,
            "x-none",
            "1",
        );
        assert_eq!(Detector::new(&platform).office_name().unwrap(), ProductId::OfficeC2R2013);
    }

    #[test]
    fn release_ids_in_64bit_view_beat_culture() {
        let platform = click_to_run(MemoryPlatform::new())
            .with_value(View::Registry64, keys::CLICK_TO_RUN_15_CULTURE, "x-none", "1")
            .with_value(View::Registry64, keys::CLICK_TO_RUN_CONFIGURATION, "ProductReleaseIds", "O365ProPlusRetail");
        assert_eq!(Detector::new(&platform).office_name().unwrap(), ProductId::OfficeC2R2016);
    }

    #[test]
    fn no_evidence_is_unsupported_product() {
        let platform = MemoryPlatform::new();
        let detector = Detector::new(&platform);
        assert!(matches!(detector.office_name(), Err(DetectionFault::UnsupportedProduct)));
        assert!(!detector.is_office_supported().unwrap());
        assert!(!detector.uses_system_licensing_service().unwrap());
    }

    #[test]
    fn support_and_licensing_flags() {
        let platform = install_root(windows(6, 1, 7601), View::Registry64, 15, r"C:\Office15\");
        let detector = Detector::new(&platform);
        assert!(detector.is_office_supported().unwrap());
        assert!(!detector.uses_system_licensing_service().unwrap());

        let platform = install_root(windows(6, 2, 9200), View::Registry64, 15, r"C:\Office15\");
        assert!(Detector::new(&platform).uses_system_licensing_service().unwrap());

        let platform = install_root(windows(10, 0, 19045), View::Registry32, 12, r"C:\Office12\");
        assert!(!Detector::new(&platform).is_office_supported().unwrap());
    }

    #[test]
    fn service_transport_failure_propagates() {
        let platform = MemoryPlatform::new().with_offline(offscrub_platform::memory::Offline {
            services: true,
            ..Default::default()
        });
        let err = Detector::new(&platform).is_office_supported().unwrap_err();
        assert!(matches!(err, DetectionFault::Platform(e) if e.is_transport()));
    }
}

mod install_path {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn traditional_path_follows_architecture_view() {
        let platform = install_root(MemoryPlatform::new(), View::Registry32, 16, r"C:\Program Files (x86)\Microsoft Office\root\Office16\");
        let record = Detector::new(&platform).installation().unwrap();
        assert_eq!(record.product, ProductId::Office2016);
        assert_eq!(record.architecture, ArchitectureTag::EmulatedWOW64);
        assert_eq!(
            record.install_path,
            PathBuf::from(r"C:\Program Files (x86)\Microsoft Office\root\Office16\")
        );
    }

    #[test]
    fn click_to_run_path_appends_office16() {
        let platform = click_to_run(MemoryPlatform::new())
            .with_value(View::Registry64, keys::CLICK_TO_RUN, "InstallPath", r"C:\Program Files\Microsoft Office\")
            .with_value(View::Registry64, keys::CLICK_TO_RUN_CONFIGURATION, "ProductReleaseIds", "ProPlus2019Retail")
            .with_value(View::Registry64, keys::CLICK_TO_RUN_CONFIGURATION, "Platform", "x64");
        let detector = Detector::new(&platform);
        assert_eq!(
            detector.installation_path().unwrap(),
            PathBuf::from(r"C:\Program Files\Microsoft Office\Office16\")
        );
    }

    #[test]
    fn click_to_run_2013_uses_program_files_layout() {
        let platform = MemoryPlatform::new()
            .with_service("ClickToRunSvc")
            .with_env("SystemDrive", "D:")
            .with_value(View::Registry64, keys::CLICK_TO_RUN_15, "PackageGUID", "{guid}")
            .with_value(View::Registry64, keys::CLICK_TO_RUN_15_CULTURE, "x-none", "1")
            .with_value(View::Registry64, keys::CLICK_TO_RUN_15_CONFIGURATION, "Platform", "x86");
        assert_eq!(
            Detector::new(&platform).installation_path().unwrap(),
            PathBuf::from(r"D:\Program Files (x86)\Microsoft Office\Office15\")
        );
    }

    #[test]
    fn missing_path_is_a_fault() {
        let platform = click_to_run(MemoryPlatform::new())
            .with_value(View::Registry64, keys::CLICK_TO_RUN_CONFIGURATION, "ProductReleaseIds", "O365ProPlusRetail");
        assert!(matches!(
            Detector::new(&platform).installation_path(),
            Err(DetectionFault::InstallPathNotFound)
        ));
    }
}

mod report {
    use super::*;

    #[test]
    fn machine_without_office_still_reports_os() {
        let platform = windows(10, 0, 17134);
        let report = Detector::new(&platform).detect().unwrap();
        assert_eq!(report.os.name, OsName::Windows10);
        assert_eq!(report.os_architecture, ArchitectureTag::Native64);
        assert!(report.office.is_none());
    }

    #[test]
    fn unresolved_architecture_keeps_os_facts() {
        let platform = click_to_run(windows(10, 0, 19045))
            .with_value(View::Registry64, keys::CLICK_TO_RUN, "InstallPath", r"C:\Program Files\Microsoft Office")
            .with_value(View::Registry64, keys::CLICK_TO_RUN_CONFIGURATION, "ProductReleaseIds", "ProPlus2021Volume");
        let report = Detector::new(&platform).detect().unwrap();
        assert_eq!(report.os.name, OsName::Windows10);
        assert_eq!(report.os.build_number, 19045);
        assert!(report.office.is_none());
    }

    #[test]
    fn unresolved_install_path_keeps_os_facts() {
        let platform = click_to_run(windows(10, 0, 19045))
            .with_value(View::Registry64, keys::CLICK_TO_RUN_CONFIGURATION, "ProductReleaseIds", "ProPlus2021Volume")
            .with_value(View::Registry64, keys::CLICK_TO_RUN_CONFIGURATION, "Platform", "x64");
        let report = Detector::new(&platform).detect().unwrap();
        assert_eq!(report.os.name, OsName::Windows10);
        assert!(report.office.is_none());
    }

    #[test]
    fn probe_failure_during_office_resolution_aborts() {
        let platform = windows(10, 0, 19045).with_offline(offscrub_platform::memory::Offline {
            services: true,
            ..Default::default()
        });
        assert!(matches!(
            Detector::new(&platform).detect(),
            Err(DetectionFault::Platform(_))
        ));
    }

    #[test]
    fn report_serializes_labels() {
        let platform = install_root(windows(6, 3, 9600), View::Registry64, 15, r"C:\Office15\");
        let report = Detector::new(&platform).detect().unwrap();
        let office = report.office.as_ref().unwrap();
        assert!(office.is_supported);
        assert!(office.uses_system_licensing_service);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["os"]["name"], "Windows 8.1");
        assert_eq!(json["office"]["product"], "Microsoft Office 2013");
        assert_eq!(json["office"]["architecture"], "x64");
    }

    #[test]
    fn resolution_is_repeatable() {
        let platform = click_to_run(windows(10, 0, 19045))
            .with_value(View::Registry64, keys::CLICK_TO_RUN, "InstallPath", r"C:\Program Files\Microsoft Office")
            .with_value(View::Registry64, keys::CLICK_TO_RUN_CONFIGURATION, "ProductReleaseIds", "ProPlus2019Volume")
            .with_value(View::Registry64, keys::CLICK_TO_RUN_CONFIGURATION, "Platform", "x86");
        let detector = Detector::new(&platform);
        assert_eq!(detector.detect().unwrap(), detector.detect().unwrap());
    }
}
