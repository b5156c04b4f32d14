//! Contract bindings for the Megaphone auction and its USDC currency.

use alloy::sol;

sol! {
    #[sol(rpc)]
    #[derive(Debug)]
    contract IMegaphone {
        function auction()
            external
            view
            returns (
                uint256 tokenId,
                bool isDayPreBought,
                uint256 highestBidAmount,
                uint256 highestBidFid,
                address highestBidder,
                uint256 highestBidTimestamp,
                uint256 startTime,
                uint256 endTime,
                bool settled,
                uint256 metadataValidUntil,
                uint256 metadataFid
            );

        function settings()
            external
            view
            returns (
                address usdcToken,
                address treasury,
                uint256 createBidReservePrice,
                uint256 timeBuffer,
                bool launched,
                uint256 scheduledEndTime,
                uint256 maxExtensionTime,
                uint256 metadataValidUntil,
                uint256 metadataFid,
                int256 minPreBuyId,
                int256 maxPreBuyId,
                bool allowPreBuy,
                address verifierAddress,
                uint256 revSharePercent,
                uint256 preBuyPremiumPercent
            );

        function getPreBuyAmount() external view returns (uint256);

        function getPreBuyStatus() external view returns (bool[] memory);

        function preBuyAuction(
            uint256 amount,
            uint256 auctionId,
            uint256 fid,
            string calldata name
        ) external;

        function preBuyAuctionWithRevShare(
            uint256 amount,
            uint256 auctionId,
            uint256 fid,
            string calldata name,
            bytes calldata signature,
            address referrer
        ) external;
    }
}

sol! {
    #[sol(rpc)]
    #[derive(Debug)]
    contract IERC20 {
        function approve(address spender, uint256 amount) external returns (bool);

        function allowance(address owner, address spender) external view returns (uint256);

        function balanceOf(address account) external view returns (uint256);
    }
}
