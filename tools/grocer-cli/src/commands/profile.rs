//! Customer profile commands.

use anyhow::{Context as _, Result};
use grocer_commerce::customer::{GeoPoint, NewProfile, ProfileService, Residence, UserProfile};
use grocer_commerce::UserId;

use super::{ProfileArgs, ProfileCommand, UserTypeArg};
use crate::context::Context;

/// Run the profile command.
pub async fn run(args: ProfileArgs, ctx: &Context) -> Result<()> {
    let profiles = ProfileService::new(ctx.open_store().await?)
        .with_default_city(ctx.config.delivery.default_city.clone());

    match args.command {
        ProfileCommand::Create {
            first_name,
            last_name,
            email,
            phone,
            user_type,
            university,
            hostel,
            block,
            room,
            address,
            landmark,
            township,
            city,
            latitude,
            longitude,
        } => {
            let user = ctx.require_user()?;
            let residence = match user_type {
                UserTypeArg::Student => Residence::Student {
                    university: university.unwrap_or_default(),
                    hostel: hostel.unwrap_or_default(),
                    block,
                    room,
                },
                UserTypeArg::NonStudent => Residence::NonStudent {
                    address: address.unwrap_or_default(),
                    landmark,
                    township: township.unwrap_or_default(),
                    city: city.unwrap_or_default(),
                },
            };
            let location = match (latitude, longitude) {
                (Some(lat), Some(lng)) => Some(GeoPoint::new(lat, lng)?),
                _ => None,
            };

            let profile = profiles
                .create_profile(
                    user,
                    NewProfile {
                        first_name,
                        last_name,
                        email,
                        phone_number: phone,
                        residence,
                        location,
                    },
                )
                .await?;

            if ctx.output.is_json() {
                ctx.output.json(&profile);
            } else {
                ctx.output.success(&format!("Saved profile for {}", profile.username));
                print_profile(&profile, ctx);
            }
            Ok(())
        }
        ProfileCommand::Show { user } => {
            let user = match user {
                Some(id) => UserId::new(id),
                None => ctx.require_user()?.clone(),
            };
            let profile = profiles
                .get_profile(&user)
                .await?
                .with_context(|| format!("No profile for {}. Create one with `grocer profile create`.", user))?;

            if ctx.output.is_json() {
                ctx.output.json(&profile);
            } else {
                print_profile(&profile, ctx);
            }
            Ok(())
        }
        ProfileCommand::List => {
            let all = profiles.list_profiles().await?;

            if ctx.output.is_json() {
                ctx.output.json(&all);
                return Ok(());
            }

            ctx.output.header(&format!("Profiles ({})", all.len()));
            let widths = [20, 24, 12, 14];
            ctx.output.table_row(&["USER", "NAME", "TYPE", "PHONE"], &widths);
            for profile in &all {
                ctx.output.table_row(
                    &[
                        profile.id.as_str(),
                        profile.username.as_str(),
                        profile.residence.user_type(),
                        profile.phone_number.as_str(),
                    ],
                    &widths,
                );
            }
            Ok(())
        }
    }
}

fn print_profile(profile: &UserProfile, ctx: &Context) {
    ctx.output.header(&profile.username);
    ctx.output.kv("user", profile.id.as_str());
    ctx.output.kv("email", &profile.email);
    ctx.output.kv("phone", &profile.phone_number);
    ctx.output.kv("type", profile.residence.user_type());
    ctx.output.kv("delivers to", &profile.residence.describe());
    if let Some(point) = &profile.location {
        ctx.output.kv(
            "location",
            &format!("{:.5}, {:.5}", point.latitude, point.longitude),
        );
    }
}
