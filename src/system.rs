use sysinfo::{CpuRefreshKind, RefreshKind, System};

pub fn get_available_cpu_cores() -> usize {
    let mut system =
        System::new_with_specifics(RefreshKind::nothing().with_cpu(CpuRefreshKind::everything()));
    system.refresh_cpu_list(CpuRefreshKind::everything());
    system.cpus().len().max(1)
}
