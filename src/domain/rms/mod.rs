pub mod resource_manager_trait;
pub mod response;
pub mod scontrol;
pub mod slurm_time;
